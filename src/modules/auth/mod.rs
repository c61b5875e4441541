pub mod token_codec;

pub use token_codec::decode_username;
