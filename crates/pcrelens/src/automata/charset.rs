//! Byte-range character sets (`spec.md` §4.7): the alphabet the automata
//! core reasons over is restricted to `u8`, matching the subset of PCRE the
//! automata layer accepts (ASCII/byte-level literals, classes, and
//! shorthands — Unicode property classes raise `Error::Complexity`, never
//! reaching this type).
//!
//! No direct teacher analogue (`plotnik` has no automata layer); grounds on
//! the general posture of representing a finite alphabet as normalized,
//! merged, disjoint ranges, the same shape `regex-automata`-style crates
//! expose publicly (see `DESIGN.md`).

use std::fmt;

/// An immutable set of bytes represented as sorted, disjoint, maximally
/// merged inclusive ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharSet {
    ranges: Vec<(u8, u8)>,
}

impl CharSet {
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn full() -> Self {
        Self {
            ranges: vec![(0, 255)],
        }
    }

    pub fn single(b: u8) -> Self {
        Self { ranges: vec![(b, b)] }
    }

    pub fn range(lo: u8, hi: u8) -> Self {
        if lo > hi {
            Self::empty()
        } else {
            Self { ranges: vec![(lo, hi)] }
        }
    }

    /// Builds a set from possibly-unsorted, possibly-overlapping ranges.
    pub fn from_ranges(ranges: impl IntoIterator<Item = (u8, u8)>) -> Self {
        let mut rs: Vec<(u8, u8)> = ranges.into_iter().filter(|(lo, hi)| lo <= hi).collect();
        rs.sort_unstable();
        Self {
            ranges: merge(rs.drain(..)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, b: u8) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if b < lo {
                    std::cmp::Ordering::Greater
                } else if b > hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn ranges(&self) -> &[(u8, u8)] {
        &self.ranges
    }

    /// The first byte in the set, if any, used by the ReDoS analyzer's
    /// "ambiguous adjacent quantifiers" heuristic to build a sample input.
    pub fn sample_byte(&self) -> Option<u8> {
        self.ranges.first().map(|&(lo, _)| lo)
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut all: Vec<(u8, u8)> = self.ranges.iter().chain(other.ranges.iter()).copied().collect();
        all.sort_unstable();
        Self {
            ranges: merge(all.drain(..)),
        }
    }

    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let (a_lo, a_hi) = self.ranges[i];
            let (b_lo, b_hi) = other.ranges[j];
            let lo = a_lo.max(b_lo);
            let hi = a_hi.min(b_hi);
            if lo <= hi {
                out.push((lo, hi));
            }
            if a_hi < b_hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { ranges: out }
    }

    pub fn subtract(&self, other: &Self) -> Self {
        self.intersect(&other.complement())
    }

    pub fn complement(&self) -> Self {
        let mut out = Vec::new();
        let mut next = 0u16;
        for &(lo, hi) in &self.ranges {
            if (lo as u16) > next {
                out.push((next as u8, lo - 1));
            }
            next = hi as u16 + 1;
        }
        if next <= 255 {
            out.push((next as u8, 255));
        }
        Self { ranges: out }
    }

    /// `true` if the two sets share at least one byte, used to decide
    /// whether two adjacent quantified atoms could both match the same next
    /// byte (§4.6's "ambiguous adjacent quantifiers" heuristic).
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }
}

fn merge(ranges: impl Iterator<Item = (u8, u8)>) -> Vec<(u8, u8)> {
    let mut out: Vec<(u8, u8)> = Vec::new();
    for (lo, hi) in ranges {
        if let Some(last) = out.last_mut() {
            if lo as i32 <= last.1 as i32 + 1 {
                last.1 = last.1.max(hi);
                continue;
            }
        }
        out.push((lo, hi));
    }
    out
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ranges.is_empty() {
            return write!(f, "[]");
        }
        let mut first = true;
        for &(lo, hi) in &self.ranges {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            if lo == hi {
                write!(f, "{}", display_byte(lo))?;
            } else {
                write!(f, "{}-{}", display_byte(lo), display_byte(hi))?;
            }
        }
        Ok(())
    }
}

fn display_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        (b as char).to_string()
    } else {
        format!("\\x{b:02x}")
    }
}

/// PCRE character-type shorthand sets restricted to ASCII (§4.7.1: Unicode
/// casefolding/character properties are out of the automata-supported
/// subset; `\d`/`\w`/`\s` and friends are modeled over ASCII only).
pub fn char_type(letter: u8) -> Option<CharSet> {
    let set = match letter.to_ascii_lowercase() {
        b'd' => CharSet::range(b'0', b'9'),
        b'w' => CharSet::range(b'0', b'9')
            .union(&CharSet::range(b'a', b'z'))
            .union(&CharSet::range(b'A', b'Z'))
            .union(&CharSet::single(b'_')),
        b's' => CharSet::from_ranges([(b' ', b' '), (b'\t', b'\t'), (b'\n', b'\n'), (0x0b, 0x0d)]),
        b'h' => CharSet::from_ranges([(b' ', b' '), (b'\t', b'\t')]),
        b'v' => CharSet::from_ranges([(0x0a, 0x0d)]),
        _ => return None,
    };
    if letter.is_ascii_uppercase() {
        Some(set.complement())
    } else {
        Some(set)
    }
}

/// POSIX bracket-expression classes (`[:alpha:]` etc.), ASCII-only.
pub fn posix_class(name: &str) -> Option<CharSet> {
    Some(match name {
        "alpha" => CharSet::range(b'a', b'z').union(&CharSet::range(b'A', b'Z')),
        "digit" => CharSet::range(b'0', b'9'),
        "alnum" => CharSet::range(b'a', b'z')
            .union(&CharSet::range(b'A', b'Z'))
            .union(&CharSet::range(b'0', b'9')),
        "upper" => CharSet::range(b'A', b'Z'),
        "lower" => CharSet::range(b'a', b'z'),
        "space" => char_type(b's')?,
        "blank" => CharSet::from_ranges([(b' ', b' '), (b'\t', b'\t')]),
        "punct" => CharSet::from_ranges([(0x21, 0x2f), (0x3a, 0x40), (0x5b, 0x60), (0x7b, 0x7e)]),
        "cntrl" => CharSet::from_ranges([(0, 0x1f), (0x7f, 0x7f)]),
        "graph" => CharSet::range(0x21, 0x7e),
        "print" => CharSet::range(0x20, 0x7e),
        "xdigit" => CharSet::range(b'0', b'9')
            .union(&CharSet::range(b'a', b'f'))
            .union(&CharSet::range(b'A', b'F')),
        "word" => char_type(b'w')?,
        _ => return None,
    })
}

/// Every byte except `\n`, the default meaning of `.` outside dot-all mode.
pub fn dot(dot_all: bool) -> CharSet {
    if dot_all {
        CharSet::full()
    } else {
        CharSet::single(b'\n').complement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_merges_adjacent_ranges() {
        let a = CharSet::range(b'a', b'm');
        let b = CharSet::range(b'n', b'z');
        let u = a.union(&b);
        assert_eq!(u.ranges(), &[(b'a', b'z')]);
    }

    #[test]
    fn complement_of_full_is_empty() {
        assert!(CharSet::full().complement().is_empty());
    }

    #[test]
    fn complement_is_involution() {
        let s = CharSet::range(b'a', b'z');
        assert_eq!(s.complement().complement(), s);
    }

    #[test]
    fn intersect_finds_overlap() {
        let a = CharSet::range(b'a', b'm');
        let b = CharSet::range(b'g', b'z');
        assert_eq!(a.intersect(&b).ranges(), &[(b'g', b'm')]);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn subtract_removes_overlap() {
        let a = CharSet::range(b'a', b'z');
        let b = CharSet::range(b'm', b'z');
        assert_eq!(a.subtract(&b).ranges(), &[(b'a', b'l')]);
    }

    #[test]
    fn digit_class_contains_only_ascii_digits() {
        let d = char_type(b'd').unwrap();
        assert!(d.contains(b'5'));
        assert!(!d.contains(b'a'));
    }
}
