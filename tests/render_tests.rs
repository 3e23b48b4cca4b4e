use chrono::NaiveDate;
use patternlog::clock::Snapshot;
use patternlog::render::{render_at, BLOCK_SIZE};
use patternlog::{render, render_fmt, Color, Level, LevelRegistry, Message, Template};
use std::cell::Cell;
use std::fmt;

fn snapshot(h: u32, m: u32, s: u32) -> Snapshot {
    let local = NaiveDate::from_ymd_opt(2008, 2, 29)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap();
    Snapshot::new(local, 1_204_243_200, 3_601)
}

fn line(format: &str, level: &Level, message: Message<'_>, now: &Snapshot) -> String {
    let template = Template::compile(format).unwrap();
    render_at(level, &template, message, now).unwrap()
}

struct Tally<'c> {
    calls: &'c Cell<usize>,
    text: &'static str,
}

impl fmt::Display for Tally<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.calls.set(self.calls.get() + 1);
        f.write_str(self.text)
    }
}

#[test]
fn test_templates_without_directives_render_verbatim() {
    let formats = ["", "hello", "a longer line, with: punctuation!", "tabs\tand\nnewlines"];
    let levels = [Level::MESSAGE, Level::WARNING, Level::FATAL];
    for format in formats {
        let template = Template::compile(format).unwrap();
        for level in &levels {
            assert_eq!(render(level, &template, "ignored").unwrap(), format);
            assert_eq!(
                render_fmt(level, &template, format_args!("{}", 1)).unwrap(),
                format
            );
        }
    }
}

#[test]
fn test_percent_escape_renders_percent() {
    let template = Template::compile("%%").unwrap();
    assert_eq!(render(&Level::MESSAGE, &template, "x").unwrap(), "%");
}

#[test]
fn test_level_and_message() {
    let template = Template::compile("%l: %L").unwrap();
    assert_eq!(render(&Level::ERROR, &template, "boom").unwrap(), "Error: boom");
}

#[test]
fn test_custom_level_prefix() {
    let mut registry = LevelRegistry::new();
    let level = registry.new_level("The prefix", Color::Yellow, true).unwrap();
    let template = Template::compile("[%l] %L").unwrap();
    assert_eq!(
        render(&level, &template, "My special message").unwrap(),
        "[The prefix] My special message"
    );
}

#[test]
fn test_full_demo_line() {
    let now = snapshot(17, 3, 9);
    let out = line(
        "[%l] %H:%m:%s, %d/%M/%y (%P) <%c>: %L",
        &Level::MESSAGE,
        Message::Text("My test message"),
        &now,
    );
    assert_eq!(
        out,
        "[Message] 17:03:09, 29/02/08 (1204243200) <Fri Feb 29 17:03:09 2008>: My test message"
    );
}

#[test]
fn test_time_fields_share_one_snapshot() {
    let now = snapshot(23, 59, 59);
    let out = line("%H:%m:%s|%h|%Y|%p", &Level::DEBUG, Message::Text(""), &now);
    assert_eq!(out, "23:59:59|11|2008|3601");
}

#[test]
fn test_hour12_boundaries() {
    for (hour, expected) in [(0, "12"), (1, "1"), (11, "11"), (12, "12"), (13, "1"), (23, "11")] {
        let out = line("%h", &Level::MESSAGE, Message::Text(""), &snapshot(hour, 0, 0));
        assert_eq!(out, expected, "hour {hour}");
    }
}

#[test]
fn test_zero_padding_of_fields() {
    let out = line("%H %m %s", &Level::MESSAGE, Message::Text(""), &snapshot(0, 0, 0));
    assert_eq!(out, "00 00 00");
}

#[test]
fn test_years_outside_the_common_range() {
    let local = NaiveDate::from_ymd_opt(2100, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let now = Snapshot::new(local, 4_102_444_800, 0);
    let out = line("%y %Y %P", &Level::MESSAGE, Message::Text(""), &now);
    assert_eq!(out, "00 2100 4102444800");
}

#[test]
fn test_message_formatted_independently_of_repeats() {
    let now = snapshot(1, 1, 1);

    let once = Cell::new(0);
    line(
        "%L",
        &Level::MESSAGE,
        Message::Args(format_args!("{}", Tally { calls: &once, text: "abc" })),
        &now,
    );

    let twice = Cell::new(0);
    let out = line(
        "%L / %L",
        &Level::MESSAGE,
        Message::Args(format_args!("{}", Tally { calls: &twice, text: "abc" })),
        &now,
    );

    assert_eq!(out, "abc / abc");
    // one measuring pass and one write, however many times %L appears
    assert_eq!(once.get(), 2);
    assert_eq!(twice.get(), 2);
}

#[test]
fn test_plain_arguments_are_not_measured() {
    let template = Template::compile("%L|%L").unwrap();
    let out = render_fmt(&Level::MESSAGE, &template, format_args!("no args")).unwrap();
    assert_eq!(out, "no args|no args");
}

#[test]
fn test_growth_past_initial_block() {
    let literal = "L".repeat(400);
    let format = format!("{literal}%L{literal}%L{literal}");
    let template = Template::compile(&format).unwrap();
    let message = "m".repeat(3 * BLOCK_SIZE);

    let out = render_fmt(&Level::MESSAGE, &template, format_args!("<{}>", message)).unwrap();
    let expected = format!("{literal}<{message}>{literal}<{message}>{literal}");
    assert_eq!(out.len(), expected.len());
    assert_eq!(out, expected);
}

#[test]
fn test_many_small_fragments() {
    let format = "%l-".repeat(1000);
    let template = Template::compile(&format).unwrap();
    let out = render(&Level::WARNING, &template, "").unwrap();
    assert_eq!(out, "Warning-".repeat(1000));
}

#[test]
fn test_unicode_message() {
    let template = Template::compile("« %L »").unwrap();
    let out = render_fmt(&Level::MESSAGE, &template, format_args!("{}🌍", "Hello, 世界! ")).unwrap();
    assert_eq!(out, "« Hello, 世界! 🌍 »");
}

#[test]
fn test_live_clock_render() {
    let template = Template::compile("%Y-%M-%d %P").unwrap();
    let out = render(&Level::MESSAGE, &template, "").unwrap();
    let (date, epoch) = out.split_once(' ').unwrap();
    assert_eq!(date.len(), 10);
    assert!(epoch.parse::<i64>().unwrap() > 1_600_000_000);
}
