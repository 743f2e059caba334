use crate::calls::FunctionCall;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().label.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

/// `caller ➡️ callee  line N` row of a call listing
pub fn call_edge(call: &FunctionCall) {
    let t = theme();
    let tag = if call.is_constructor_call {
        "new, "
    } else if call.is_await {
        "await, "
    } else {
        ""
    };
    println!(
        "  {} {} {} {}",
        call.caller_name.style(t.caller.clone()),
        Icons::RIGHT,
        call.callee_name.style(t.call_site(call.is_constructor_call, call.is_await)),
        format!("{}line {}", tag, call.line_number).style(t.muted.clone())
    );
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK.style(theme().label.clone()), elapsed);
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label.clone()), value);
}
