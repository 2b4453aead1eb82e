//! # Fixture Module
//!
//! Small hello-world functions used to check that debuggers, test runners and
//! the `patternkit hello` subcommand are wired up.

/// Greeting returned by [`greet`]
pub const GREETING: &str = "Hello, World!";

#[must_use]
pub fn greet() -> &'static str {
    GREETING
}

#[must_use]
pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// `a * b + 10`
#[must_use]
pub fn calculate(a: i64, b: i64) -> i64 {
    a * b + 10
}

#[must_use]
pub fn is_even(n: i64) -> bool {
    n % 2 == 0
}

/// Lines printed by `patternkit hello`: the greeting, one line per extra
/// argument, and a sample sum.
#[must_use]
pub fn hello_lines(args: &[String]) -> Vec<String> {
    let mut lines = vec![greet().to_string()];
    if !args.is_empty() {
        lines.push(format!("Arguments: {}", args.len()));
        lines.extend(
            args.iter()
                .enumerate()
                .map(|(i, arg)| format!("  [{}] {}", i, arg)),
        );
    }
    lines.push(format!("5 + 3 = {}", add(5, 3)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greet() {
        assert_eq!(greet(), "Hello, World!");
    }

    #[test]
    fn test_add() {
        let cases = [(2, 3, 5), (-1, 1, 0), (0, 0, 0), (-4, -6, -10)];
        for (a, b, want) in cases {
            assert_eq!(add(a, b), want, "add({a}, {b})");
        }
    }

    #[test]
    fn test_calculate() {
        let cases = [(5, 3, 25), (0, 7, 10), (-2, 4, 2), (10, 10, 110)];
        for (a, b, want) in cases {
            assert_eq!(calculate(a, b), want, "calculate({a}, {b})");
        }
    }

    #[test]
    fn test_is_even() {
        let cases = [(0, true), (1, false), (2, true), (-3, false), (-8, true)];
        for (n, want) in cases {
            assert_eq!(is_even(n), want, "is_even({n})");
        }
    }

    #[test]
    fn test_hello_lines_without_args() {
        assert_eq!(hello_lines(&[]), vec!["Hello, World!", "5 + 3 = 8"]);
    }

    #[test]
    fn test_hello_lines_echo_args() {
        let args = vec!["one".to_string(), "two".to_string()];
        assert_eq!(
            hello_lines(&args),
            vec![
                "Hello, World!",
                "Arguments: 2",
                "  [0] one",
                "  [1] two",
                "5 + 3 = 8",
            ]
        );
    }
}
