// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Terminal clipboard delivery over OSC 52.

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::io::Write;

/// Common terminal limit on the base64 payload of one OSC 52 sequence.
pub const MAX_OSC52_PAYLOAD: usize = 74_994;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Passthrough {
    #[default]
    None,
    /// `ESC P tmux; <seq with ESC doubled> ESC \`
    Tmux,
    /// `ESC P <seq> ESC \`
    Screen,
}

impl Passthrough {
    pub fn detect(tmux: Option<&str>, term: Option<&str>) -> Self {
        if tmux.is_some_and(|value| !value.is_empty()) {
            return Self::Tmux;
        }
        if term.is_some_and(|value| value.starts_with("screen")) {
            return Self::Screen;
        }
        Self::None
    }

    pub fn from_env() -> Self {
        let tmux = std::env::var("TMUX").ok();
        let term = std::env::var("TERM").ok();
        Self::detect(tmux.as_deref(), term.as_deref())
    }
}

pub fn osc52_sequence(text: &str) -> Result<String> {
    let encoded = STANDARD.encode(text.as_bytes());
    if encoded.len() > MAX_OSC52_PAYLOAD {
        bail!(
            "clipboard payload too large ({} > {MAX_OSC52_PAYLOAD} bytes)",
            encoded.len()
        );
    }
    Ok(format!("\x1b]52;c;{encoded}\x07"))
}

pub fn write_osc52(writer: &mut impl Write, text: &str, passthrough: Passthrough) -> Result<()> {
    let sequence = osc52_sequence(text)?;
    let bytes = sequence.as_bytes();
    match passthrough {
        Passthrough::None => writer.write_all(bytes),
        Passthrough::Tmux => write_tmux(writer, bytes),
        Passthrough::Screen => writer
            .write_all(b"\x1bP")
            .and_then(|()| writer.write_all(bytes))
            .and_then(|()| writer.write_all(b"\x1b\\")),
    }
    .context("write clipboard sequence")?;
    writer.flush().context("flush clipboard sequence")
}

fn write_tmux(writer: &mut impl Write, sequence: &[u8]) -> std::io::Result<()> {
    writer.write_all(b"\x1bPtmux;")?;
    for &byte in sequence {
        if byte == 0x1b {
            writer.write_all(b"\x1b\x1b")?;
        } else {
            writer.write_all(&[byte])?;
        }
    }
    writer.write_all(b"\x1b\\")
}
