//! Byte-level BPE tokenizer for GPT-2 style `tokenizer.json` artifacts.
//!
//! ```no_run
//! let tokenizer = bpekit::Tokenizer::from_file("tokenizer.json")?;
//! let ids = tokenizer.encode("Hello world", true);
//! let text = tokenizer.decode(&ids, true);
//! assert_eq!(text, "Hello world");
//! # Ok::<(), bpekit::LoadError>(())
//! ```

pub mod added_tokens;
pub mod bpe;
pub mod byte_level;
pub mod error;
pub mod merges;
pub mod pre_tokenizer;
pub mod tokenizer;
pub mod vocab;

pub use bpe::BpeCache;
pub use error::LoadError;
pub use tokenizer::{SpecialTokenIds, Tokenizer, GPT2_END_OF_TEXT};
