pub mod chatbot;
pub mod mailer;
