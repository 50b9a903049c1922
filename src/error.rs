//! Error types for parsing family documents

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Option<Span>,
        message: String,
    },
}

impl ParseError {
    pub fn message(&self) -> &str {
        match self {
            ParseError::Syntax { message, .. } => message,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Syntax { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let ParseError::Syntax { span, message } = self;
        let offset = span.as_ref().map_or(0, |s| s.start);

        let mut report = Report::build(ReportKind::Error, filename, offset).with_message(message);
        if let Some(span) = span {
            report = report.with_label(
                Label::new((filename, span.clone()))
                    .with_message(message)
                    .with_color(Color::Red),
            );
        }

        if report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return self.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl From<toml::de::Error> for ParseError {
    fn from(err: toml::de::Error) -> Self {
        ParseError::Syntax {
            span: err.span(),
            message: err.message().trim().to_string(),
        }
    }
}
