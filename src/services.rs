//! Side-effect services used by the interpreter: where printed text goes,
//! where `read()` takes its lines from, and where `random()` draws from.
//!
//! Each service is a small enum so the interpreter can run against the real
//! process streams or against in-memory buffers in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

/// Destination of `print`, `println` and `dump`.
#[derive(Debug)]
pub enum OutputSink {
    /// Writes to stdout, flushing after each write.
    Stdout,
    /// Captures everything written.
    Buffer(String),
}

impl OutputSink {
    pub fn buffer() -> Self {
        OutputSink::Buffer(String::new())
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        match self {
            OutputSink::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()
            }
            OutputSink::Buffer(buffer) => {
                buffer.push_str(text);
                Ok(())
            }
        }
    }

    pub fn println(&mut self, text: &str) -> io::Result<()> {
        self.print(text)?;
        self.print("\n")
    }

    /// Captured output. Empty for stdout.
    pub fn output(&self) -> &str {
        match self {
            OutputSink::Stdout => "",
            OutputSink::Buffer(buffer) => buffer,
        }
    }
}

/// Source of lines for `read()`.
#[derive(Debug)]
pub enum InputSource {
    Stdin,
    /// Queued lines, consumed front to back.
    Lines(VecDeque<String>),
}

impl InputSource {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputSource::Lines(lines.into_iter().map(Into::into).collect())
    }

    /// Next line without its terminator, or `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        match self {
            InputSource::Stdin => {
                let mut line = String::new();
                if io::stdin().lock().read_line(&mut line)? == 0 {
                    return Ok(None);
                }
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Ok(Some(line))
            }
            InputSource::Lines(queue) => Ok(queue.pop_front()),
        }
    }
}

/// xorshift64* generator backing `random()`.
#[derive(Debug, Clone)]
pub struct RandomSource {
    state: u64,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        // A zero state would stay zero forever.
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    /// Seeds from the system clock.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(nanos)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits fill the f32 mantissa exactly.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// Everything a running program can reach outside its own variables.
#[derive(Debug)]
pub struct Services {
    pub output: OutputSink,
    pub input: InputSource,
    pub random: RandomSource,
}

impl Services {
    /// Process streams, random seeded from `seed` or the clock.
    pub fn stdio(seed: Option<u64>) -> Self {
        Self {
            output: OutputSink::Stdout,
            input: InputSource::Stdin,
            random: seed.map(RandomSource::new).unwrap_or_else(RandomSource::from_clock),
        }
    }

    /// In-memory streams with a fixed seed.
    pub fn buffered<I, S>(input: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: OutputSink::buffer(),
            input: InputSource::lines(input),
            random: RandomSource::new(seed),
        }
    }
}
