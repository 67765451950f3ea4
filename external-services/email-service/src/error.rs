use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Config(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] mail_send::Error),
}

pub type EmailResult<T> = Result<T, EmailError>;
