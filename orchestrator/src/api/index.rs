const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>AACE Compass API</title>
</head>
<body>
  <h1>AACE Compass API</h1>
  <p>Ask questions about AACE resources. Answers are generated from passages
  retrieved from the document index, and every answer lists its sources.</p>
  <ul>
    <li><code>POST /api/query</code> with <code>{"query": "..."}</code></li>
    <li><code>GET /health</code></li>
    <li><code>GET /metrics</code></li>
  </ul>
</body>
</html>
"#;

pub fn handle_index() -> impl warp::Reply {
    warp::reply::html(INDEX_HTML)
}
