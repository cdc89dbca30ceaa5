//! This module provides the parser for Turing Machine definitions, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a `Program` struct.

use crate::types::{
    Direction, HeadStart, InstructionKey, Program, Symbol, TransitionRule, TuringMachineError,
    DEFAULT_BLANK_SYMBOL, INPUT_BLANK_SYMBOL, MAX_PROGRAM_SIZE,
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given input string into a `Program` struct.
///
/// This is the main entry point for parsing machine definitions. It checks the input size,
/// parses it using the `TuringMachineParser`, and then processes the resulting parse tree
/// into a structured `Program`.
///
/// # Arguments
///
/// * `input` - A string slice containing the machine definition.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed.
/// * `Err(TuringMachineError::ParseError)` if there are syntax errors, duplicate sections
///   or duplicate transition rules.
/// * `Err(TuringMachineError::ValidationError)` if a required section is missing.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::ValidationError(format!(
            "Program is too large: {} bytes (maximum {})",
            input.len(),
            MAX_PROGRAM_SIZE
        )));
    }

    let root = TuringMachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".to_string()))?;

    parse_program(root)
}

/// Parses the top-level structure of a definition from a `Pair<Rule::program>`.
///
/// Sections may appear in any order, so the tape and the rules are only interpreted once
/// the blank symbol is known.
fn parse_program(pair: Pair<Rule>) -> Result<Program, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<Symbol> = None;
    let mut tape: Option<Pair<Rule>> = None;
    let mut origin: Option<i64> = None;
    let mut head: Option<i64> = None;
    let mut start: Option<String> = None;
    let mut halting_states: Option<Vec<String>> = None;
    let mut rules: Option<Pair<Rule>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let rule = p.as_rule();

        check_unique_rule(rule, p.as_span(), &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p).trim().to_string()),
            Rule::blank => blank = Some(parse_symbol(&parse_inner_string(p))),
            Rule::tape => tape = Some(p),
            Rule::origin => origin = Some(parse_index(p)?),
            Rule::head => head = Some(parse_index(p)?),
            Rule::start => start = Some(parse_inner_string(p)),
            Rule::halt => halting_states = Some(parse_states(p)),
            Rule::rules => rules = Some(p),
            _ => {} // Skip EOI
        }
    }

    // Handle mandatory checks
    let name = check_required_rule(name, "name")?;
    let tape = check_required_rule(tape, "tape")?;
    let rules = check_required_rule(rules, "rules")?;
    let blank = blank.unwrap_or(DEFAULT_BLANK_SYMBOL);

    let tape = parse_tape(tape, blank);
    let rules = parse_transitions(rules, blank)?;
    let origin = origin.unwrap_or(0);

    // The cell after the tape content must still be addressable
    if i64::try_from(tape.len())
        .ok()
        .and_then(|len| origin.checked_add(len))
        .is_none()
    {
        return Err(TuringMachineError::ValidationError(format!(
            "Tape of {} symbols does not fit at origin {}",
            tape.len(),
            origin
        )));
    }

    // The first rule's source state is the default initial state
    let initial_state = match start {
        Some(state) => state,
        None => rules
            .first()
            .map(|rule| rule.state.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(
                    "Missing 'start' section and no rules to infer it from".to_string(),
                )
            })?,
    };

    Ok(Program {
        name,
        initial_state,
        halting_states: halting_states.unwrap_or_default(),
        blank,
        tape,
        origin,
        head: head.map_or(HeadStart::Leftmost, HeadStart::At),
        rules,
    })
}

/// Parses the tape symbols from a `Pair<Rule::tape>`, mapping `INPUT_BLANK_SYMBOL` to `blank`.
fn parse_tape(pair: Pair<Rule>, blank: Symbol) -> Vec<Symbol> {
    // Rule: tape > symbols? > [symbol]
    pair.into_inner()
        .flat_map(|symbols| symbols.into_inner())
        .map(|symbol| resolve_blank(parse_symbol(symbol.as_str()), blank))
        .collect()
}

/// Parses the transition rules section from a `Pair<Rule::rules>`.
///
/// Rejects a second rule for the same state and symbol, since only one of them could ever
/// fire.
fn parse_transitions(
    pair: Pair<Rule>,
    blank: Symbol,
) -> Result<Vec<TransitionRule>, TuringMachineError> {
    let mut transitions = Vec::new();
    let mut keys = HashSet::new();

    for transition_pair in pair.into_inner() {
        let span = transition_pair.as_span();
        let transition = parse_transition(transition_pair, blank)?;

        if !keys.insert(InstructionKey::new(transition.state.as_str(), transition.read)) {
            return Err(parse_error(
                &format!(
                    "Duplicate transition rule: {}, {}",
                    transition.state, transition.read
                ),
                span,
            ));
        }

        transitions.push(transition);
    }

    Ok(transitions)
}

/// Parses a single rule `state, read -> next, write, direction` from a `Pair<Rule::transition>`.
fn parse_transition(pair: Pair<Rule>, blank: Symbol) -> Result<TransitionRule, TuringMachineError> {
    let mut pairs = pair.into_inner();

    let state = parse_string(&mut pairs)?;
    let read = resolve_blank(parse_symbol(&parse_string(&mut pairs)?), blank);
    let next_state = parse_string(&mut pairs)?;
    let write = resolve_blank(parse_symbol(&parse_string(&mut pairs)?), blank);
    let direction = parse_direction(next_pair(&mut pairs)?)?;

    Ok(TransitionRule {
        state,
        read,
        next_state,
        write,
        direction,
    })
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports '<' or 'L' for Left, '>' or 'R' for Right, and '-' or 'S' for Stay.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    let span = pair.as_span();
    let mut chars = pair.as_str().chars();

    match (chars.next(), chars.next()) {
        (Some(code), None) => Direction::try_from(code)
            .map_err(|_| parse_error(&format!("Unsupported direction: {code}"), span)),
        _ => Err(parse_error(
            &format!("Unsupported direction: {}", pair.as_str()),
            span,
        )),
    }
}

/// Parses the comma-separated halting states from a `Pair<Rule::halt>`.
fn parse_states(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner().map(|p| p.as_str().to_string()).collect()
}

/// Parses a signed position from a `Pair<Rule::origin>` or `Pair<Rule::head>`.
fn parse_index(pair: Pair<Rule>) -> Result<i64, TuringMachineError> {
    let span = pair.as_span();
    let value = pair.into_inner().next().map(|p| p.as_str()).unwrap_or_default();

    value
        .parse::<i64>()
        .map_err(|_| parse_error(&format!("Invalid position: {value}"), span))
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Parses a single character symbol from a string, handling quoted and unquoted symbols.
fn parse_symbol(input: &str) -> Symbol {
    let unquoted = input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input);

    unquoted.chars().next().unwrap_or(DEFAULT_BLANK_SYMBOL)
}

/// Replaces `INPUT_BLANK_SYMBOL` with the program's blank symbol.
fn resolve_blank(symbol: Symbol, blank: Symbol) -> Symbol {
    if symbol == INPUT_BLANK_SYMBOL {
        blank
    } else {
        symbol
    }
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> Result<String, TuringMachineError> {
    next_pair(pairs).map(|p| p.as_str().to_string())
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>, TuringMachineError> {
    pairs.next().ok_or_else(|| {
        TuringMachineError::ValidationError("Incomplete transition rule".to_string())
    })
}

/// Checks if a given section has already been declared, ensuring uniqueness for top-level
/// sections.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if rule == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::TuringMachine;

    const BINARY_INCREMENT: &str = r#"
name: Binary increment
tape: 1, 0, 1
halt: q2
rules:
  q0, 0 -> q0, 0, R
  q0, 1 -> q0, 1, R
  q0, _ -> q1, _, L
  q1, 0 -> q2, 1, S
  q1, 1 -> q1, 0, L
  q1, _ -> q2, 1, S
"#;

    #[test]
    fn test_parse_simple_program() {
        let result = parse(BINARY_INCREMENT);
        assert!(result.is_ok());

        let program = result.unwrap();
        assert_eq!(program.name, "Binary increment");
        assert_eq!(program.initial_tape(), "101");
        assert_eq!(program.initial_state, "q0");
        assert_eq!(program.halting_states, vec!["q2"]);
        assert_eq!(program.blank, DEFAULT_BLANK_SYMBOL);
        assert_eq!(program.origin, 0);
        assert_eq!(program.head, HeadStart::Leftmost);
        assert_eq!(program.rules.len(), 6);
        assert_eq!(
            program.rules[2],
            TransitionRule::new("q0", '_', "q1", '_', Direction::Left)
        );
    }

    #[test]
    fn test_parsed_program_runs() {
        let program = parse(BINARY_INCREMENT).unwrap();
        let result = TuringMachine::from_program(&program).execute();

        assert_eq!(result.tape, "110");
        assert_eq!(result.state, "q2");
        assert!(result.is_in_final_state);
        assert!(!result.has_crashed);
    }

    #[test]
    fn test_parse_all_sections() {
        let input = r#"
# A program using every section
name: Everything   # trailing comment
blank: '0'
tape: 1, _, 1
origin: -3
head: 4
start: a
halt: h, done
rules:
  a, 1 -> b, 1, >

  # blank lines and comments between rules
  b, 0 -> h, '#', -
  b, 1 -> done, ' ', <
"#;
        let program = parse(input).unwrap();

        assert_eq!(program.name, "Everything");
        assert_eq!(program.blank, '0');
        assert_eq!(program.tape, vec!['1', '0', '1']);
        assert_eq!(program.origin, -3);
        assert_eq!(program.head, HeadStart::At(4));
        assert_eq!(program.initial_state, "a");
        assert_eq!(program.halting_states, vec!["h", "done"]);
        assert_eq!(
            program.rules[1],
            TransitionRule::new("b", '0', "h", '#', Direction::Stay)
        );
        assert_eq!(program.rules[2].read, '1');
        assert_eq!(program.rules[2].write, ' ');
        assert_eq!(program.rules[2].direction, Direction::Left);
    }

    #[test]
    fn test_parse_sections_in_any_order() {
        let input = r#"
rules:
  s, x -> t, y, R
halt: t
tape: x
name: Reordered
"#;
        let program = parse(input).unwrap();

        assert_eq!(program.name, "Reordered");
        assert_eq!(program.initial_state, "s");
        assert_eq!(program.halting_states, vec!["t"]);
    }

    #[test]
    fn test_parse_empty_tape() {
        let input = r#"
name: Empty
tape:
halt: h
rules:
  a, _ -> h, 1, R
"#;
        let program = parse(input).unwrap();

        assert!(program.tape.is_empty());
        assert!(program.tape().is_empty());
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: First Name
name: Second Name
tape: a
rules:
  start, a -> halt, b, R
"#;
        let result = parse(input);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate \"name:\" declaration"));
    }

    #[test]
    fn test_parse_missing_name() {
        let input = r#"
tape: a
rules:
  start, a -> halt, b, R
"#;
        let error = parse(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'name' section"
        );
    }

    #[test]
    fn test_parse_missing_tape() {
        let input = r#"
name: Missing Tape
rules:
  start, a -> halt, b, R
"#;
        let result = parse(input);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'tape' section"
        );
    }

    #[test]
    fn test_parse_missing_rules() {
        let input = r#"
name: Missing Rules
tape: a
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'rules' section"
        );
    }

    #[test]
    fn test_parse_no_rules_requires_start() {
        let input = r#"
name: No Rules
tape: a
rules:
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));

        let with_start = format!("{}start: idle\n", input.trim_start());
        let program = parse(&with_start).unwrap();
        assert_eq!(program.initial_state, "idle");
        assert!(program.rules.is_empty());
    }

    #[test]
    fn test_parse_duplicate_transition_rule() {
        let input = r#"
name: Duplicate Transition
tape: a
rules:
  start, a -> halt, b, R
  start, a -> start, a, L
"#;
        let result = parse(input);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate transition rule: start, a"));
    }

    #[test]
    fn test_parse_duplicate_after_blank_rewrite() {
        let input = r#"
name: Blank Collision
blank: 0
tape: 1
rules:
  s, 0 -> s, 1, R
  s, _ -> s, 1, R
"#;
        let error = parse(input).unwrap_err();
        assert!(error.to_string().contains("Duplicate transition rule: s, 0"));
    }

    #[test]
    fn test_parse_unsupported_direction() {
        let input = r#"
name: Bad Direction
tape: a
rules:
  start, a -> halt, b, X
"#;
        let result = parse(input);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }

    #[test]
    fn test_parse_malformed_rule() {
        let input = r#"
name: Malformed
tape: a
rules:
  start, a -> halt, R
"#;
        assert!(matches!(
            parse(input).unwrap_err(),
            TuringMachineError::ParseError(_)
        ));
    }

    #[test]
    fn test_parse_with_custom_blank() {
        let input = r#"
name: Custom Blank
blank: 'b'
tape: a, _, a
rules:
  start, _ -> halt, _, R
"#;
        let program = parse(input).unwrap();

        assert_eq!(program.blank, 'b');
        assert_eq!(program.initial_tape(), "aba");
        assert_eq!(program.rules[0].read, 'b');
        assert_eq!(program.rules[0].write, 'b');
        assert_eq!(program.tape().render(), "aba");
        assert_eq!(program.tape().len(), 2);
    }

    #[test]
    fn test_parse_invalid_position() {
        let input = r#"
name: Huge Head
head: 99999999999999999999999
tape: a
rules:
  start, a -> halt, b, R
"#;
        let error = parse(input).unwrap_err();
        assert!(error.to_string().contains("Invalid position"));
    }

    #[test]
    fn test_parse_origin_too_large() {
        let input = r#"
name: Edge
origin: 9223372036854775807
tape: 1
halt: h
rules:
  a, 1 -> h, 1, S
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert!(error.to_string().contains("does not fit at origin"));

        // The same origin is fine while the tape is empty.
        let empty = input.replace("tape: 1", "tape:");
        let program = parse(&empty).unwrap();
        assert_eq!(program.origin, i64::MAX);
        assert!(program.tape().is_empty());
    }

    #[test]
    fn test_parse_extreme_head_runs() {
        let input = r#"
name: Left Edge
head: -9223372036854775808
tape:
halt: h
rules:
  a, _ -> h, 1, L
"#;
        let program = parse(input).unwrap();
        assert_eq!(program.head, HeadStart::At(i64::MIN));

        let result = TuringMachine::from_program(&program).execute();
        assert!(result.is_in_final_state);
        assert_eq!(result.head_position, i64::MIN);
    }

    #[test]
    fn test_parse_too_large() {
        let input = "#".repeat(MAX_PROGRAM_SIZE + 1);
        let error = parse(&input).unwrap_err();

        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert!(error.to_string().contains("too large"));
    }
}
