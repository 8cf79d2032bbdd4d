use std::fmt::Display;

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, PartialEq)]
pub enum BindError {
    #[error("No free port in {first}..={last}: {last_error}")]
    PortsExhausted {
        first: u16,
        last: u16,
        last_error: String,
    },

    #[error("At least one bind attempt is required")]
    NoAttempts,
}

/// Tries `bind` on `start_port`, moving to the next port on failure, at most
/// `attempts` times. Returns the port that bound and whatever `bind` produced.
pub fn bind_with_retry<T, E, B>(
    start_port: u16,
    attempts: u16,
    mut bind: B,
) -> Result<(u16, T), BindError>
where
    E: Display,
    B: FnMut(u16) -> Result<T, E>,
{
    if attempts == 0 {
        return Err(BindError::NoAttempts);
    }

    let mut last_error = String::new();
    let mut port = start_port;

    for attempt in 1..=attempts {
        match bind(port) {
            Ok(bound) => return Ok((port, bound)),
            Err(e) => {
                warn!("Port {} unavailable (attempt {}/{}): {}", port, attempt, attempts, e);
                last_error = e.to_string();
            }
        }

        if attempt == attempts {
            break;
        }
        match port.checked_add(1) {
            Some(next) => port = next,
            None => break,
        }
    }

    Err(BindError::PortsExhausted {
        first: start_port,
        last: port,
        last_error,
    })
}
