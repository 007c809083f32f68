//! Configuration model for confgraph: the normalized value tree, format
//! detection, and the parser adapter that lowers INI/YAML/TOML/JSON into it.

pub mod format;
pub mod ini;
pub mod parse;
pub mod source;
pub mod value;

pub use confgraph_error::{Error, ErrorKind, Result};
pub use format::ConfigFormat;
pub use parse::{parse_config, parse_str};
pub use source::SourcePath;
pub use value::{ConfigValue, Mapping};
