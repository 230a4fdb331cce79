//! Immutable, timestamped trace events with lazy or eager formatted
//! payloads and an optional captured call stack (spec.md §2.1, §4.1).
//!
//! ## Construction modes
//!
//! - *Eager*: the string is rendered once, at creation time.
//! - *Lazy*: the format string and its [`LazyArg`] list are kept around
//!   (inspectable, per spec.md §9) and rendered the first time [`Event::what`]
//!   is called. Concurrent readers observe the same memoized string — a
//!   [`OnceLock`] guarantees one-time computation with readers coordinating
//!   through it rather than a hand-rolled atomic flag.
//!
//! Call stacks are captured eagerly as raw frames at creation (cheap) and
//! resolved to `(function, file:line)` lazily on first read (expensive),
//! mirroring the teacher's split between stack-based hot-path construction
//! and deferred, display-time resolution.

mod __test__;

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Mutex, OnceLock};

/// Maximum number of raw frames captured per event.
pub const MAX_STACK_DEPTH: usize = 16;

/// A single inspectable lazy-format argument. A closed sum type (rather
/// than a boxed closure) keeps the arguments of an unevaluated lazy event
/// inspectable, per spec.md §9.
#[derive(Debug, Clone)]
pub enum LazyArg {
  Str(String),
  I64(i64),
  U64(u64),
  F64(f64),
  Bool(bool),
  Debug(String),
}

impl fmt::Display for LazyArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LazyArg::Str(s) => write!(f, "{s}"),
      LazyArg::I64(v) => write!(f, "{v}"),
      LazyArg::U64(v) => write!(f, "{v}"),
      LazyArg::F64(v) => write!(f, "{v}"),
      LazyArg::Bool(v) => write!(f, "{v}"),
      LazyArg::Debug(v) => write!(f, "{v}"),
    }
  }
}

macro_rules! impl_from_lazy_arg {
  ($ty:ty, $variant:ident) => {
    impl From<$ty> for LazyArg {
      fn from(v: $ty) -> Self {
        LazyArg::$variant(v.into())
      }
    }
  };
}

impl_from_lazy_arg!(&str, Str);
impl_from_lazy_arg!(String, Str);
impl_from_lazy_arg!(i64, I64);
impl_from_lazy_arg!(i32, I64);
impl_from_lazy_arg!(u64, U64);
impl_from_lazy_arg!(u32, U64);
impl_from_lazy_arg!(usize, U64);
impl_from_lazy_arg!(f64, F64);
impl_from_lazy_arg!(bool, Bool);

/// Renders `format` by substituting each `{}` placeholder, in order, with
/// the `Display` of the corresponding argument. Extra placeholders are
/// left as-is; extra arguments are ignored — this is diagnostic text, not
/// a contract, so it degrades rather than panics.
pub(crate) fn render(format: &str, args: &[LazyArg]) -> String {
  let mut out = String::with_capacity(format.len() + args.len() * 8);
  let mut args = args.iter();
  let mut chars = format.char_indices().peekable();
  while let Some((i, c)) = chars.next() {
    if c == '{' && chars.peek().map(|(_, c)| *c) == Some('}') {
      chars.next();
      match args.next() {
        Some(arg) => {
          use std::fmt::Write;
          let _ = write!(out, "{arg}");
        }
        None => out.push_str("{}"),
      }
    } else {
      out.push_str(&format[i..i + c.len_utf8()]);
    }
  }
  out
}

enum Payload {
  Eager(String),
  Lazy {
    format: &'static str,
    args: Mutex<Option<Vec<LazyArg>>>,
    cached: OnceLock<String>,
  },
}

/// One resolved call-stack frame.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
  pub function: String,
  pub file_line: String,
}

enum StackPayload {
  None,
  Raw(backtrace::Backtrace),
  Resolved(Vec<Frame>),
}

/// A captured call stack, resolved to symbols lazily on first read.
pub struct Stack {
  inner: Mutex<StackPayload>,
}

impl Stack {
  fn capture() -> Self {
    Self {
      inner: Mutex::new(StackPayload::Raw(backtrace::Backtrace::new_unresolved())),
    }
  }

  fn none() -> Self {
    Self {
      inner: Mutex::new(StackPayload::None),
    }
  }

  /// Frames, newest-call-first, with frames belonging to this crate's own
  /// API elided. Resolves symbols on first call and memoizes the result.
  pub fn frames(&self) -> Vec<Frame> {
    let mut guard = self.inner.lock().unwrap();
    if let StackPayload::Resolved(frames) = &*guard {
      return frames.clone();
    }
    let resolved = match &mut *guard {
      StackPayload::Raw(bt) => {
        bt.resolve();
        let mut frames = Vec::with_capacity(bt.frames().len());
        for frame in bt.frames() {
          for symbol in frame.symbols() {
            let function = symbol
              .name()
              .map(|n| n.to_string())
              .unwrap_or_else(|| "<unknown>".to_string());
            if function.starts_with("trc::") || function.starts_with("backtrace::") {
              continue;
            }
            let file_line = match (symbol.filename(), symbol.lineno()) {
              (Some(f), Some(l)) => format!("{}:{l}", f.display()),
              (Some(f), None) => f.display().to_string(),
              _ => String::new(),
            };
            frames.push(Frame { function, file_line });
          }
        }
        frames.truncate(MAX_STACK_DEPTH);
        frames
      }
      StackPayload::None => Vec::new(),
      StackPayload::Resolved(_) => unreachable!(),
    };
    *guard = StackPayload::Resolved(resolved.clone());
    resolved
  }

  pub fn is_captured(&self) -> bool {
    !matches!(*self.inner.lock().unwrap(), StackPayload::None)
  }
}

/// One time-stamped entry inside a [`Trace`](crate::trace::Trace).
pub struct Event {
  when: DateTime<Utc>,
  payload: Payload,
  is_error: bool,
  stack: Stack,
}

impl Event {
  pub fn eager(what: impl Into<String>, is_error: bool, capture_stack: bool) -> Self {
    Self {
      when: Utc::now(),
      payload: Payload::Eager(what.into()),
      is_error,
      stack: if capture_stack { Stack::capture() } else { Stack::none() },
    }
  }

  pub fn lazy(
    format: &'static str,
    args: Vec<LazyArg>,
    is_error: bool,
    capture_stack: bool,
  ) -> Self {
    Self {
      when: Utc::now(),
      payload: Payload::Lazy {
        format,
        args: Mutex::new(Some(args)),
        cached: OnceLock::new(),
      },
      is_error,
      stack: if capture_stack { Stack::capture() } else { Stack::none() },
    }
  }

  /// A synthetic event inserted when a trace's event list is truncated;
  /// never counted against `eventsMax` itself (spec.md §3/§4.4).
  pub fn synthetic_truncated(count: u64) -> Self {
    Self::eager(format!("(truncated {count} events)"), false, false)
  }

  pub fn when(&self) -> DateTime<Utc> {
    self.when
  }

  pub fn is_error(&self) -> bool {
    self.is_error
  }

  pub fn has_stack(&self) -> bool {
    self.stack.is_captured()
  }

  pub fn stack_frames(&self) -> Vec<Frame> {
    self.stack.frames()
  }

  /// The formatted message. Deterministic after the first call: lazy
  /// payloads are rendered once and memoized via [`OnceLock`], so
  /// concurrent readers always agree on the final string.
  pub fn what(&self) -> String {
    match &self.payload {
      Payload::Eager(s) => s.clone(),
      Payload::Lazy { format, args, cached } => cached
        .get_or_init(|| {
          let taken = args.lock().unwrap().take().unwrap_or_default();
          render(format, &taken)
        })
        .clone(),
    }
  }
}

impl fmt::Debug for Event {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Event")
      .field("when", &self.when)
      .field("is_error", &self.is_error)
      .field("what", &self.what())
      .finish()
  }
}
