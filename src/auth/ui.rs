use std::fmt;
use std::io::{self, BufRead, Write};

const API_KEY_PROMPT: &str = "Enter your Gemini API key: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for UiError {}

fn io_error(err: io::Error) -> UiError {
    UiError::new(err.to_string())
}

fn read_trimmed_line<R: BufRead>(input: &mut R) -> Result<String, UiError> {
    let mut line = String::new();
    input.read_line(&mut line).map_err(io_error)?;
    Ok(line.trim().to_string())
}

pub fn prompt_api_key<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<String, UiError> {
    write!(output, "{API_KEY_PROMPT}").map_err(io_error)?;
    output.flush().map_err(io_error)?;

    let key = read_trimmed_line(input)?;
    if key.is_empty() {
        return Err(UiError::new("API key cannot be empty"));
    }
    Ok(key)
}

pub fn prompt_confirmation<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> Result<ConfirmationChoice, UiError> {
    write!(output, "{question} [y/N]: ").map_err(io_error)?;
    output.flush().map_err(io_error)?;
    parse_confirmation(&read_trimmed_line(input)?)
}

pub fn parse_confirmation(input: &str) -> Result<ConfirmationChoice, UiError> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return Ok(ConfirmationChoice::No);
    }
    match trimmed.as_str() {
        "y" | "yes" => Ok(ConfirmationChoice::Yes),
        "n" | "no" => Ok(ConfirmationChoice::No),
        _ => Err(UiError::new("Invalid confirmation response")),
    }
}
