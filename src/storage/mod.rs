pub mod codec;
pub mod table_file;

pub use codec::{LineReader, decode_line, encode_line};
pub use table_file::{MAX_TABLE_PATH_LEN, TableContents, TableFile, WriteOptions};
