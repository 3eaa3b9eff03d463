//! # Command Descriptor
//!
//! Immutable specification of one device command: a (possibly
//! parameterized) command keyword plus the parser that turns a decoded
//! reply frame into a domain value.

use crate::error::{ProtocolError, Result};
use crate::protocol::Frame;
use std::sync::Arc;

/// Parser from a decoded reply frame to a domain value
pub type ResultParser<T> = Arc<dyn Fn(&Frame) -> Result<T> + Send + Sync>;

/// Placeholder substituted with the command argument
pub const PARAM_PLACEHOLDER: &str = "{}";

/// Immutable descriptor binding a command template to a reply parser
///
/// Commands either take no argument (`QPIGS`) or exactly one argument
/// drawn from a fixed set of allowed values substituted into the
/// template (`POP{}` with `00`/`01`/`02`).
pub struct Command<T> {
    name: String,
    allowed_values: Option<Vec<String>>,
    parser: ResultParser<T>,
}

impl<T> Command<T> {
    /// Create a zero-argument command descriptor
    ///
    /// The name is trimmed and upper-cased.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] if the name contains a
    /// [`PARAM_PLACEHOLDER`]; a parameterized template needs an
    /// allowed-value set, via [`Command::with_values`].
    pub fn new<F>(name: &str, parser: F) -> Result<Self>
    where
        F: Fn(&Frame) -> Result<T> + Send + Sync + 'static,
    {
        let name = name.trim().to_ascii_uppercase();

        if name.contains(PARAM_PLACEHOLDER) {
            return Err(ProtocolError::InvalidArgument(format!(
                "command '{}' has a '{}' placeholder but no allowed-value set",
                name, PARAM_PLACEHOLDER
            )));
        }

        Ok(Self {
            name,
            allowed_values: None,
            parser: Arc::new(parser),
        })
    }

    /// Create a single-argument command descriptor
    ///
    /// The template must contain exactly one [`PARAM_PLACEHOLDER`];
    /// `build` substitutes the argument into it after checking
    /// membership in `allowed_values`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] if the template has no
    /// placeholder or the allowed-value set is empty.
    pub fn with_values<F, I, S>(name: &str, allowed_values: I, parser: F) -> Result<Self>
    where
        F: Fn(&Frame) -> Result<T> + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.trim().to_ascii_uppercase();
        let allowed_values: Vec<String> = allowed_values.into_iter().map(Into::into).collect();

        if !name.contains(PARAM_PLACEHOLDER) {
            return Err(ProtocolError::InvalidArgument(format!(
                "command template '{}' has no '{}' placeholder",
                name, PARAM_PLACEHOLDER
            )));
        }

        if allowed_values.is_empty() {
            return Err(ProtocolError::InvalidArgument(format!(
                "command '{}' has an empty allowed-value set",
                name
            )));
        }

        Ok(Self {
            name,
            allowed_values: Some(allowed_values),
            parser: Arc::new(parser),
        })
    }

    /// The normalized command template
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the ASCII command string for the given argument
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] when an argument is
    /// supplied to a zero-argument command, missing for a parameterized
    /// command, or not a member of the allowed-value set.
    pub fn render(&self, arg: Option<&str>) -> Result<String> {
        match &self.allowed_values {
            None => match arg {
                None => Ok(self.name.clone()),
                Some(_) => Err(ProtocolError::InvalidArgument(
                    "wrong number of arguments (1 for 0)".to_string(),
                )),
            },
            Some(values) => {
                let arg = arg.ok_or_else(|| {
                    ProtocolError::InvalidArgument(
                        "wrong number of arguments (0 for 1)".to_string(),
                    )
                })?;

                if !values.iter().any(|v| v == arg) {
                    return Err(ProtocolError::InvalidArgument(format!(
                        "'{}' is not accepted input (valid input: {:?})",
                        arg, values
                    )));
                }

                Ok(self.name.replacen(PARAM_PLACEHOLDER, arg, 1))
            }
        }
    }

    /// Build the protocol frame for the given argument
    pub fn build(&self, arg: Option<&str>) -> Result<Frame> {
        Frame::from_ascii(&self.render(arg)?)
    }

    /// Decode a hex reply and run the bound parser on it
    ///
    /// # Errors
    ///
    /// Any failure from decoding or from the parser is flattened into a
    /// single [`ProtocolError::ParseFailure`] carrying the original
    /// failure's kind name and message.
    pub fn parse_reply(&self, hex: &str) -> Result<T> {
        Frame::from_hex(hex)
            .and_then(|frame| (self.parser)(&frame))
            .map_err(ProtocolError::into_parse_failure)
    }

    pub(crate) fn parser(&self) -> ResultParser<T> {
        Arc::clone(&self.parser)
    }
}

impl<T> std::fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("allowed_values", &self.allowed_values)
            .finish_non_exhaustive()
    }
}

impl<T> std::fmt::Display for Command<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command('{}')", self.name)
    }
}
