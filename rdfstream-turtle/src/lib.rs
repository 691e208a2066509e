//! Streaming Turtle reader and Turtle writer.
//!
//! The reader emits to any [`rdfstream_ir::TripleSink`]; the writer is
//! itself a sink, so a document can be piped straight from one to the other.
//!
//! # Example
//!
//! ```
//! use rdfstream_ir::Graph;
//! use rdfstream_turtle::{parse, TurtleWriter};
//!
//! let turtle = r#"
//!     @prefix ex: <http://example.org/> .
//!     ex:alice ex:name "Alice" ;
//!              ex:knows ( ex:bob ex:carol ) .
//! "#;
//!
//! // Option 1: collect the triples
//! let mut graph = Graph::new();
//! parse(turtle, &mut graph).unwrap();
//! assert_eq!(graph.len(), 6);
//!
//! // Option 2: re-serialize
//! let mut writer = TurtleWriter::default();
//! parse(turtle, &mut writer).unwrap();
//! let text = writer.into_string();
//! assert!(text.contains("ex:alice ex:name \"Alice\""));
//! ```

pub mod chars;
mod cursor;
pub mod error;
pub mod reader;
pub mod writer;

pub use error::{Result, TurtleError};
pub use reader::{parse, TurtleReader, TurtleReaderOptions};
pub use writer::{TurtleWriter, TurtleWriterOptions};
