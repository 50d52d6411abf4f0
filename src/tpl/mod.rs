mod cache;
pub mod engine;
pub mod lexer;
pub mod library;
pub mod node;
pub mod parser;
pub mod render_context;
pub mod scanner;
pub mod serializer;
pub mod tags;
pub mod token;
pub mod value;
