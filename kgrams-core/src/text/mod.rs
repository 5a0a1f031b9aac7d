//! Low-level text cursors shared by the k-gram engine and the smoothers.

mod circular_buffer;
mod word_stream;

pub use circular_buffer::CircularBuffer;
pub use word_stream::WordStream;
