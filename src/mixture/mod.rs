pub mod block;
pub mod parser;

pub use block::MixtureBlock;
pub use parser::{parse_blocks, parse_nodes, ConfigNode};
