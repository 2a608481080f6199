//! Random-access byte input and the cursor built on top of it.
//!
//! Matchers never see a whole buffer: they see a [`Cursor`], which amortizes
//! chunk lookups the same way a rope slice does (compare
//! `RopeSlice::chunk_at_byte` in a rope crate's public API) and returns a
//! sentinel NUL byte once the stream is exhausted so matchers can fail
//! cheaply instead of special-casing end-of-input everywhere.

/// One chunk of the underlying byte stream, together with the absolute
/// offset at which it begins and the token to hand back to
/// [`Input::get_next_chunk`] once this chunk is exhausted.
///
/// By convention `token` doubles as "the offset the *next* chunk begins at",
/// so `get_next_chunk(token)` is simply `get_chunk(token)` for every
/// implementation in this crate; the two methods remain distinct in the
/// trait because a chunk store that can't binary-search by offset (e.g. a
/// linked list of pieces) may need a different, cheaper path for "the next
/// one" than for "the one at this arbitrary position".
#[derive(Debug, Clone, Copy)]
pub struct ChunkRef<'a, T> {
    pub token: T,
    pub data: &'a [u8],
    pub base: usize,
}

/// A random-access, chunked byte stream.
///
/// Implementors must return a zero-length terminal chunk once `pos` reaches
/// or passes the end of the stream; the cursor relies on that to synthesize
/// the NUL sentinel rather than tracking length separately.
pub trait Input<'a> {
    type Token: Copy + Eq;

    fn get_chunk(&self, pos: usize) -> ChunkRef<'a, Self::Token>;
    fn get_next_chunk(&self, token: Self::Token) -> ChunkRef<'a, Self::Token>;
}

/// An in-memory buffer, treated as a single chunk.
#[derive(Debug, Clone, Copy)]
pub struct StringInput<'a> {
    bytes: &'a [u8],
}

impl<'a> StringInput<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
        }
    }

    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl<'a> Input<'a> for StringInput<'a> {
    type Token = usize;

    fn get_chunk(&self, pos: usize) -> ChunkRef<'a, usize> {
        if pos >= self.bytes.len() {
            ChunkRef {
                token: self.bytes.len(),
                data: &[],
                base: self.bytes.len(),
            }
        } else {
            ChunkRef {
                token: self.bytes.len(),
                data: self.bytes,
                base: 0,
            }
        }
    }

    fn get_next_chunk(&self, token: usize) -> ChunkRef<'a, usize> {
        self.get_chunk(token)
    }
}

/// A rope-backed buffer. `R` is any type exposing a ropey-style chunked view
/// (byte index in, chunk text + its base byte index out); callers typically
/// pass a `ropey::RopeSlice<'a>` directly.
#[derive(Debug, Clone, Copy)]
pub struct RopeInput<'a> {
    slice: ropey::RopeSlice<'a>,
    len: usize,
}

impl<'a> RopeInput<'a> {
    pub fn new(slice: ropey::RopeSlice<'a>) -> Self {
        Self {
            slice,
            len: slice.len_bytes(),
        }
    }
}

impl<'a> Input<'a> for RopeInput<'a> {
    type Token = usize;

    fn get_chunk(&self, pos: usize) -> ChunkRef<'a, usize> {
        if pos >= self.len {
            return ChunkRef {
                token: self.len,
                data: &[],
                base: self.len,
            };
        }
        let (chunk, base, _char_idx, _line_idx) = self.slice.chunk_at_byte(pos);
        let data = chunk.as_bytes();
        ChunkRef {
            token: base + data.len(),
            data,
            base,
        }
    }

    fn get_next_chunk(&self, token: usize) -> ChunkRef<'a, usize> {
        self.get_chunk(token)
    }
}

/// The byte returned once a [`Cursor`] passes the end of its input.
pub const NUL: u8 = 0;

/// A position into an [`Input`], with a cached chunk so repeated `peek`s
/// near the current offset never re-hit the chunk lookup.
///
/// Invariant: after `seek(p)`, `offset() == p`.
#[derive(Clone)]
pub(crate) struct Cursor<'a, I: Input<'a>> {
    input: &'a I,
    offset: usize,
    chunk: ChunkRef<'a, I::Token>,
}

impl<'a, I: Input<'a>> Cursor<'a, I> {
    pub fn new(input: &'a I, pos: usize) -> Self {
        let chunk = input.get_chunk(pos);
        let mut cursor = Cursor {
            input,
            offset: 0,
            chunk,
        };
        cursor.seek(pos);
        cursor
    }

    /// The byte at the current offset, or [`NUL`] past end-of-stream.
    pub fn peek(&self) -> u8 {
        let i = self.offset - self.chunk.base;
        self.chunk.data.get(i).copied().unwrap_or(NUL)
    }

    /// Advance one byte. Callers must only advance past a byte they've
    /// already confirmed via `peek` (i.e. non-NUL, or deliberately skipping
    /// the sentinel); advancing past end-of-stream is harmless but does not
    /// make progress.
    pub fn advance(&mut self) {
        self.offset += 1;
        let i = self.offset - self.chunk.base;
        if i >= self.chunk.data.len() {
            self.chunk = self.input.get_next_chunk(self.chunk.token);
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn seek(&mut self, pos: usize) {
        if pos >= self.chunk.base && pos - self.chunk.base < self.chunk.data.len() {
            self.offset = pos;
        } else {
            self.chunk = self.input.get_chunk(pos);
            self.offset = pos;
        }
    }
}
