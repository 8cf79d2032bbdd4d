// Context Assembler: joins retrieved passages into one prompt block

use crate::models::Match;

pub const PASSAGE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler {
    max_chars: Option<usize>,
}

impl ContextAssembler {
    pub fn new(max_chars: Option<usize>) -> Self {
        Self { max_chars }
    }

    /// Joins match texts in ranked order, one blank line between passages.
    ///
    /// With a character budget, whole passages are kept until the next one
    /// would overflow it. A first passage larger than the budget is cut at
    /// the budget instead of being dropped, so a non-empty match list never
    /// yields an empty context.
    pub fn assemble(&self, matches: &[Match]) -> String {
        let Some(budget) = self.max_chars else {
            return matches
                .iter()
                .map(|m| m.metadata.text.as_str())
                .collect::<Vec<_>>()
                .join(PASSAGE_SEPARATOR);
        };

        let mut context = String::new();
        let mut used = 0;

        for (i, m) in matches.iter().enumerate() {
            let text = m.metadata.text.as_str();
            let len = text.chars().count();

            if i == 0 {
                if len > budget {
                    return text.chars().take(budget).collect();
                }
                context.push_str(text);
                used = len;
                continue;
            }

            let needed = PASSAGE_SEPARATOR.len() + len;
            if used + needed > budget {
                break;
            }
            context.push_str(PASSAGE_SEPARATOR);
            context.push_str(text);
            used += needed;
        }

        context
    }
}
