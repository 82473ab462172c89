use ahash::HashSet;
use ahash::HashSetExt;
use core::ops::RangeInclusive;
use once_cell::sync::Lazy;

#[derive(Clone)]
pub struct CharFilter {
  chars: HashSet<char>,
}

impl CharFilter {
  pub fn new() -> CharFilter {
    CharFilter {
      chars: HashSet::new(),
    }
  }

  pub fn add_char(&mut self, c: char) {
    self.chars.insert(c);
  }

  pub fn add_chars(&mut self, chars: RangeInclusive<char>) {
    for c in chars {
      self.chars.insert(c);
    }
  }

  pub fn add_chars_from_slice(&mut self, chars: &str) {
    for c in chars.chars() {
      self.chars.insert(c);
    }
  }

  pub fn has(&self, c: char) -> bool {
    self.chars.contains(&c)
  }
}

pub const ECMASCRIPT_LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

pub const ECMASCRIPT_WHITESPACE: [char; 21] = [
  '\x09',
  '\x0b',
  '\x0c',
  '\x20',
  '\u{00A0}',
  '\u{1680}',
  '\u{2000}',
  '\u{2001}',
  '\u{2002}',
  '\u{2003}',
  '\u{2004}',
  '\u{2005}',
  '\u{2006}',
  '\u{2007}',
  '\u{2008}',
  '\u{2009}',
  '\u{200A}',
  '\u{202F}',
  '\u{205F}',
  '\u{3000}',
  '\u{FEFF}',
];

#[inline]
pub fn is_line_terminator(c: char) -> bool {
  ECMASCRIPT_LINE_TERMINATORS.contains(&c)
}

// Non-ASCII identifier characters are accepted wholesale rather than checked against the
// Unicode ID_Start/ID_Continue tables.
pub const ID_START_CHARSTR: &str = "$ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
pub const ID_CONTINUE_CHARSTR: &str =
  "$0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

#[inline]
pub fn is_id_start(c: char) -> bool {
  ID_START.has(c) || (!c.is_ascii() && !WHITESPACE.has(c) && !is_line_terminator(c))
}

#[inline]
pub fn is_id_continue(c: char) -> bool {
  ID_CONTINUE.has(c)
    || c == '\u{200C}'
    || c == '\u{200D}'
    || (!c.is_ascii() && !WHITESPACE.has(c) && !is_line_terminator(c))
}

#[inline]
pub fn is_id_continue_jsx(c: char) -> bool {
  c == '-' || is_id_continue(c)
}

pub static DIGIT: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('0'..='9');
  filter
});

pub static DIGIT_HEX: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('0'..='9');
  filter.add_chars('a'..='f');
  filter.add_chars('A'..='F');
  filter
});

pub static ID_START: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars_from_slice(ID_START_CHARSTR);
  filter
});

pub static ID_CONTINUE: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars_from_slice(ID_CONTINUE_CHARSTR);
  filter
});

pub static WHITESPACE: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  for c in ECMASCRIPT_WHITESPACE {
    filter.add_char(c);
  }
  filter
});
