//! Magnetometer text protocol
//!
//! The device answers a read command with whitespace separated tokens; a
//! reading is an `RD` marker followed by one `t,x,y,z` token. Text arrives in
//! arbitrary chunks, so a token cut at a chunk boundary is held back until
//! the next chunk (or `finish`).

use tracing::{debug, trace};

/// Token that opens a reading
pub const READING_MARKER: &str = "RD";

/// Fields in a reading payload
pub const PAYLOAD_FIELDS: usize = 4;

/// One device reading (device time in seconds, raw axis values)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceReading {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    /// Marker at the end of a line or of the input
    MissingPayload,
    /// Payload with the wrong number of fields
    FieldCount(usize),
    /// Payload field that is not a number
    NonNumeric(String),
}

/// Tokenizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerState {
    /// Skipping tokens until a marker
    #[default]
    SeekMarker,
    /// Marker seen, next token is the payload
    ParseFields,
}

/// Output of one transition
#[derive(Debug, Clone, PartialEq)]
pub enum TokenEvent {
    Emit(DeviceReading),
    Malformed(Malformed),
}

/// Counters over everything fed so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    pub readings: usize,
    pub malformed: usize,
    pub skipped_tokens: usize,
}

/// Streaming `RD t,x,y,z` tokenizer
#[derive(Debug, Default)]
pub struct ReadingTokenizer {
    state: TokenizerState,
    pending: String,
    stats: ProtocolStats,
    malformed: Vec<Malformed>,
}

impl ReadingTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TokenizerState {
        self.state
    }

    pub fn stats(&self) -> &ProtocolStats {
        &self.stats
    }

    /// Rejected records in arrival order
    pub fn malformed(&self) -> &[Malformed] {
        &self.malformed
    }

    /// Feed a chunk of device text, returning the readings it completed
    pub fn feed(&mut self, chunk: &str) -> Vec<DeviceReading> {
        self.pending.push_str(chunk);

        // Everything up to the last whitespace is made of complete tokens
        let cut = match self.pending.rfind(char::is_whitespace) {
            Some(idx) => idx + self.pending[idx..].chars().next().map_or(1, char::len_utf8),
            None => return Vec::new(),
        };
        let complete: String = self.pending.drain(..cut).collect();

        let mut out = Vec::new();
        self.scan(&complete, &mut out);
        out
    }

    /// Flush the held-back token and close the input
    pub fn finish(mut self) -> (Vec<DeviceReading>, ProtocolStats, Vec<Malformed>) {
        let rest = std::mem::take(&mut self.pending);
        let mut out = Vec::new();
        self.scan(&rest, &mut out);
        self.end_of_line();
        (out, self.stats, self.malformed)
    }

    fn scan(&mut self, text: &str, out: &mut Vec<DeviceReading>) {
        let mut token = String::new();
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !token.is_empty() {
                    self.handle_token(&token, out);
                    token.clear();
                }
                if ch == '\n' || ch == '\r' {
                    self.end_of_line();
                }
            } else {
                token.push(ch);
            }
        }
        if !token.is_empty() {
            self.handle_token(&token, out);
        }
    }

    fn handle_token(&mut self, token: &str, out: &mut Vec<DeviceReading>) {
        let (next, event) = step(self.state, token);
        if self.state == TokenizerState::SeekMarker && next == TokenizerState::SeekMarker {
            self.stats.skipped_tokens += 1;
        }
        self.state = next;
        match event {
            Some(TokenEvent::Emit(reading)) => {
                trace!(t = reading.t, "reading");
                self.stats.readings += 1;
                out.push(reading);
            }
            Some(TokenEvent::Malformed(reason)) => self.reject(reason),
            None => {}
        }
    }

    fn end_of_line(&mut self) {
        if self.state == TokenizerState::ParseFields {
            self.reject(Malformed::MissingPayload);
            self.state = TokenizerState::SeekMarker;
        }
    }

    fn reject(&mut self, reason: Malformed) {
        debug!(reason = ?reason, "malformed record");
        self.stats.malformed += 1;
        self.malformed.push(reason);
    }
}

/// One transition of the tokenizer
pub fn step(state: TokenizerState, token: &str) -> (TokenizerState, Option<TokenEvent>) {
    match state {
        TokenizerState::SeekMarker => {
            if token.starts_with(READING_MARKER) {
                (TokenizerState::ParseFields, None)
            } else {
                (TokenizerState::SeekMarker, None)
            }
        }
        TokenizerState::ParseFields => match parse_payload(token) {
            Ok(reading) => (TokenizerState::SeekMarker, Some(TokenEvent::Emit(reading))),
            Err(reason) => {
                // the rejected token may itself open the next record
                let next = if token.starts_with(READING_MARKER) {
                    TokenizerState::ParseFields
                } else {
                    TokenizerState::SeekMarker
                };
                (next, Some(TokenEvent::Malformed(reason)))
            }
        },
    }
}

/// Parse a `t,x,y,z` payload
pub fn parse_payload(token: &str) -> Result<DeviceReading, Malformed> {
    let fields: Vec<&str> = token.split(',').map(str::trim).collect();
    if fields.len() != PAYLOAD_FIELDS {
        return Err(Malformed::FieldCount(fields.len()));
    }

    let mut values = [0.0_f64; PAYLOAD_FIELDS];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field
            .parse::<f64>()
            .map_err(|_| Malformed::NonNumeric((*field).to_string()))?;
    }

    Ok(DeviceReading {
        t: values[0],
        x: values[1],
        y: values[2],
        z: values[3],
    })
}

/// Tokenize a complete capture in one go
pub fn parse_capture(text: &str) -> (Vec<DeviceReading>, ProtocolStats) {
    let mut tokenizer = ReadingTokenizer::new();
    let mut readings = tokenizer.feed(text);
    let (rest, stats, _) = tokenizer.finish();
    readings.extend(rest);
    (readings, stats)
}
