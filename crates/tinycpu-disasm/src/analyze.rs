use serde::Serialize;
use std::collections::BTreeMap;

use tinycpu::decoder::{Decoder, TableDecoder};
use tinycpu::disasm::fmt_word;
use tinycpu::expand::SkipTest;
use tinycpu::Word;

use crate::model::Image;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind { Branch, CondBranch }

/// A `sjf`/`sjfn`, `jmplo`, `jmphi` triple folded back into its pseudo jump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JumpSite {
    pub addr: usize,
    pub mnemonic: &'static str,
    pub target: usize,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelOut { pub addr: usize, pub name: String }

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub jumps: Vec<JumpSite>,
    pub labels: Vec<LabelOut>,
    pub lines: Vec<String>,
}

fn match_jump(w: &[Word]) -> Option<(&'static str, usize)> {
    let [test, lo, hi] = w else { return None };
    let mnemonic = SkipTest::from_word(test)?.jump_mnemonic()?;
    if lo.op.mnemonic != "jmplo" || hi.op.mnemonic != "jmphi" {
        return None;
    }
    Some((mnemonic, (usize::from(hi.param) << 3) | usize::from(lo.param)))
}

pub fn find_jumps(img: &Image) -> Vec<JumpSite> {
    let dec = TableDecoder::new();
    let mut out = Vec::new();
    for seg in &img.segments {
        let words: Vec<Word> = seg.bytes.iter().map(|&b| dec.decode(b)).collect();
        let mut i = 0;
        while i < words.len() {
            match words.get(i..i + 3).and_then(match_jump) {
                Some((mnemonic, target)) => {
                    let kind = if mnemonic == "jmp" { EdgeKind::Branch } else { EdgeKind::CondBranch };
                    out.push(JumpSite { addr: seg.base.wrapping_add(i), mnemonic, target, kind });
                    i += 3;
                }
                None => i += 1,
            }
        }
    }
    out
}

/// Listing with pseudo jumps restored and their targets labelled `loc_XX`.
pub fn analyze(img: &Image, show_bytes: bool) -> Report {
    let dec = TableDecoder::new();
    let jumps = find_jumps(img);
    let labels: BTreeMap<usize, String> = jumps
        .iter()
        .map(|j| (j.target, format!("loc_{:02x}", j.target)))
        .collect();
    let by_addr: BTreeMap<usize, &JumpSite> = jumps.iter().map(|j| (j.addr, j)).collect();

    let mut lines = Vec::new();
    for seg in &img.segments {
        let mut off = 0;
        while off < seg.bytes.len() {
            let addr = seg.base.wrapping_add(off);
            if let Some(lbl) = labels.get(&addr) {
                lines.push(format!("{lbl}:"));
            }
            let (width, text) = match by_addr.get(&addr) {
                Some(j) => (3, format!("{} loc_{:02x}", j.mnemonic, j.target)),
                None => (1, fmt_word(&dec.decode(seg.bytes[off]))),
            };
            let width = width.min(seg.bytes.len() - off);
            if show_bytes {
                let bytes: Vec<String> = seg.bytes[off..off + width].iter().map(|b| format!("{b:02x}")).collect();
                lines.push(format!("  {addr:#04x}: {:<9} {text}", bytes.join(" ")));
            } else {
                lines.push(format!("  {addr:#04x}: {text}"));
            }
            off += width;
        }
    }

    let labels = labels.into_iter().map(|(addr, name)| LabelOut { addr, name }).collect();
    Report { jumps, labels, lines }
}
