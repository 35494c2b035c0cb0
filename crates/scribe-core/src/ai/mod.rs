pub mod gemini;

pub use gemini::GenerativeClient;
