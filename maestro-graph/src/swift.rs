//! Pre-built concept graph for the Swift knowledge domain
//!
//! Covers the relation clusters the skill corpus is about: concurrency,
//! SwiftUI, testing, and architecture, plus an alias table for common
//! shorthands (`di`, `vm`, `s6`, ...).

use crate::graph::ConceptGraph;

/// Build the pre-computed Swift concept graph
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn swift_concept_graph() -> ConceptGraph {
    let mut g = ConceptGraph::new();

    // Concurrency
    g.add_relation("sendable", "actor isolation", 1.0);
    g.add_relation("sendable", "data race", 1.0);
    g.add_relation("sendable", "crossing boundary", 0.9);
    g.add_relation("sendable", "thread safety", 0.8);
    g.add_relation("sendable", "nonisolated", 0.7);
    g.add_relation("sendable", "@unchecked sendable", 0.8);

    g.add_relation("actor", "isolation", 1.0);
    g.add_relation("actor", "actor isolation", 1.0);
    g.add_relation("actor", "reentrancy", 0.8);
    g.add_relation("actor", "sendable", 0.9);
    g.add_relation("actor", "nonisolated", 0.8);
    g.add_relation("actor", "async", 0.7);

    g.add_relation("@mainactor", "ui thread", 1.0);
    g.add_relation("@mainactor", "main thread", 1.0);
    g.add_relation("@mainactor", "global actor", 0.9);
    g.add_relation("@mainactor", "isolation domain", 0.8);
    g.add_relation("@mainactor", "viewmodel", 0.7);
    g.add_relation("@mainactor", "actor isolation", 0.9);

    g.add_relation("async", "await", 1.0);
    g.add_relation("async", "task", 0.9);
    g.add_relation("async", "suspension point", 0.8);
    g.add_relation("async", "structured concurrency", 0.8);
    g.add_relation("async", "async let", 0.9);
    g.add_relation("async", "concurrency", 1.0);

    g.add_relation("task", "cancellation", 0.9);
    g.add_relation("task", "task group", 0.9);
    g.add_relation("task", "structured concurrency", 0.9);
    g.add_relation("task", "unstructured task", 0.7);
    g.add_relation("task", "task.detached", 0.7);
    g.add_relation("task", "priority", 0.6);

    g.add_relation("data race", "thread safety", 1.0);
    g.add_relation("data race", "sendable", 1.0);
    g.add_relation("data race", "actor isolation", 0.9);
    g.add_relation("data race", "strict concurrency", 0.9);
    g.add_relation("data race", "mutable state", 0.8);

    g.add_relation("swift 6", "strict concurrency", 1.0);
    g.add_relation("swift 6", "region-based isolation", 0.9);
    g.add_relation("swift 6", "sendable", 0.9);
    g.add_relation("swift 6", "breaking changes", 0.8);
    g.add_relation("swift 6", "migration", 0.9);

    g.add_relation("continuation", "async", 0.9);
    g.add_relation("continuation", "callback", 0.9);
    g.add_relation("continuation", "bridging", 0.8);

    // SwiftUI
    g.add_relation("@state", "source of truth", 1.0);
    g.add_relation("@state", "view update", 0.9);
    g.add_relation("@state", "private", 0.7);
    g.add_relation("@state", "@binding", 0.9);

    g.add_relation("@observable", "observation", 1.0);
    g.add_relation("@observable", "@state", 0.8);
    g.add_relation("@observable", "viewmodel", 0.9);
    g.add_relation("@observable", "ios 17", 0.8);
    g.add_relation("@observable", "macro", 0.7);

    g.add_relation("@binding", "two-way binding", 1.0);
    g.add_relation("@binding", "child view", 0.8);
    g.add_relation("@binding", "@state", 0.9);

    g.add_relation("@environment", "dependency injection", 0.9);
    g.add_relation("@environment", "environment values", 1.0);
    g.add_relation("@environment", "view hierarchy", 0.8);

    g.add_relation("navigationstack", "navigation", 1.0);
    g.add_relation("navigationstack", "navigationpath", 0.9);
    g.add_relation("navigationstack", "programmatic navigation", 0.9);
    g.add_relation("navigationstack", "deep link", 0.7);
    g.add_relation("navigationstack", "ios 16", 0.7);

    g.add_relation("viewmodel", "mvvm", 1.0);
    g.add_relation("viewmodel", "@observable", 0.9);
    g.add_relation("viewmodel", "business logic", 0.9);
    g.add_relation("viewmodel", "@mainactor", 0.8);
    g.add_relation("viewmodel", "separation of concerns", 0.8);

    g.add_relation("performance", "lazy loading", 0.9);
    g.add_relation("performance", "identity", 0.8);
    g.add_relation("performance", "equatable", 0.8);
    g.add_relation("performance", "redraw", 0.9);
    g.add_relation("performance", "profiling", 0.7);

    // Testing
    g.add_relation("@test", "swift testing", 1.0);
    g.add_relation("@test", "#expect", 0.9);
    g.add_relation("@test", "@suite", 0.8);
    g.add_relation("@test", "parameterized", 0.8);

    g.add_relation("#expect", "assertion", 1.0);
    g.add_relation("#expect", "swift testing", 0.9);
    g.add_relation("#expect", "xctest", 0.6);

    g.add_relation("mock", "test double", 1.0);
    g.add_relation("mock", "stub", 0.8);
    g.add_relation("mock", "protocol", 0.9);
    g.add_relation("mock", "dependency injection", 0.8);

    g.add_relation("xctest", "unit test", 1.0);
    g.add_relation("xctest", "xctestcase", 1.0);
    g.add_relation("xctest", "xcassertion", 0.9);
    g.add_relation("xctest", "swift testing", 0.7);

    // Architecture
    g.add_relation("mvvm", "viewmodel", 1.0);
    g.add_relation("mvvm", "separation of concerns", 0.9);
    g.add_relation("mvvm", "data binding", 0.8);
    g.add_relation("mvvm", "testability", 0.8);

    g.add_relation("clean architecture", "use case", 0.9);
    g.add_relation("clean architecture", "repository", 0.9);
    g.add_relation("clean architecture", "dependency inversion", 0.9);
    g.add_relation("clean architecture", "testability", 0.8);

    g.add_relation("dependency injection", "protocol", 0.9);
    g.add_relation("dependency injection", "testability", 0.9);
    g.add_relation("dependency injection", "inversion of control", 0.9);

    // Aliases
    g.add_alias("di", "dependency injection");
    g.add_alias("vm", "viewmodel");
    g.add_alias("s6", "swift 6");
    g.add_alias("tca", "the composable architecture");
    g.add_alias("async/await", "async");
    g.add_alias("mainactor", "@mainactor");
    g.add_alias("observable", "@observable");
    g.add_alias("state", "@state");

    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_is_populated() {
        let g = swift_concept_graph();
        assert!(g.concept_count() > 50);
    }

    #[test]
    fn test_sendable_expansion() {
        let g = swift_concept_graph();
        let expanded = g.expand("sendable warning");
        assert!(
            expanded.contains(&"actor isolation".to_string())
                || expanded.contains(&"data race".to_string())
                || expanded.contains(&"thread safety".to_string())
        );
    }

    #[test]
    fn test_alias_mainactor() {
        let g = swift_concept_graph();
        let expanded = g.expand("mainactor blocked");
        assert!(expanded.contains(&"ui thread".to_string()));
    }

    #[test]
    fn test_no_expansion_for_plain_english() {
        let g = swift_concept_graph();
        assert!(g.expand("the quick brown fox").is_empty());
    }
}
