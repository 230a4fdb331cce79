//! Declarative predicate over a [`Trace`](crate::trace::Trace), compiled
//! once per search/subscribe request (spec.md §4.5).

mod __test__;

use crate::trace::{Trace, TraceId};
use chrono::Duration as ChronoDuration;
use regex::Regex;

/// A request-shaped predicate. Every field left at its empty/`None`
/// default is "don't care" — a fully-default `Filter` allows all traces.
#[derive(Debug, Default, Clone)]
pub struct Filter {
  pub sources: Vec<String>,
  pub ids: Vec<TraceId>,
  pub category: String,
  pub is_active: Option<bool>,
  pub is_finished: Option<bool>,
  pub is_errored: Option<bool>,
  pub min_duration: Option<ChronoDuration>,
  pub query: String,
  compiled_query: Option<Regex>,
}

impl Filter {
  /// Compiles `query` and canonicalizes fields; must be called once
  /// before the first `allow`. A compile failure is not fatal: it is
  /// returned as a problem string and the query field is treated as a
  /// pass-through (no text constraint) for the rest of this filter's
  /// life.
  pub fn normalize(&mut self) -> Vec<String> {
    let mut problems = Vec::new();
    if !self.query.is_empty() {
      match Regex::new(&self.query) {
        Ok(re) => self.compiled_query = Some(re),
        Err(err) => problems.push(format!("invalid filter query regex: {err}")),
      }
    }
    problems
  }

  /// Evaluates the predicate against a live trace, short-circuiting on
  /// the first unmet condition.
  pub fn allow(&self, trace: &Trace) -> bool {
    if !self.sources.is_empty() && !self.sources.iter().any(|s| s == trace.source()) {
      return false;
    }
    if !self.ids.is_empty() && !self.ids.contains(&trace.id()) {
      return false;
    }
    if !self.category.is_empty() && self.category != trace.category() {
      return false;
    }
    if let Some(want) = self.is_active {
      if trace.is_active() != want {
        return false;
      }
    }
    if let Some(want) = self.is_finished {
      if trace.is_finished() != want {
        return false;
      }
    }
    if let Some(want) = self.is_errored {
      if (trace.is_errored() && trace.is_finished()) != want {
        return false;
      }
    }
    if let Some(min) = self.min_duration {
      if !trace.is_finished() || trace.duration() < min {
        return false;
      }
    }
    if let Some(re) = &self.compiled_query {
      let events = trace.events();
      let matched = events.iter().any(|e| {
        re.is_match(&e.what)
          || e
            .stack
            .iter()
            .any(|f| re.is_match(&f.function) || re.is_match(&f.file_line))
      });
      if !matched {
        return false;
      }
    }
    true
  }

  /// `true` if `ids` is the only selective field set — a fingerprint
  /// probe for one or a few known traces (spec.md §4.5). The core makes
  /// no further use of this; it exists for collaborators that may want
  /// to suppress category-based UI affordances for such a request.
  pub fn is_id_probe(&self) -> bool {
    !self.ids.is_empty()
      && self.category.is_empty()
      && self.sources.is_empty()
      && self.query.is_empty()
  }
}
