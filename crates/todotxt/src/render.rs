//! HTML rendering of tasks.
//!
//! The output is a fragment: `<div class="task ...">tokens</div>`. Token HTML
//! comes from each kind's template and is joined with single spaces. Values are
//! inserted as they are; escaping untrusted text is up to the caller.

use crate::config::RenderConfig;
use crate::task::Task;

pub fn render_task(task: &Task, config: &RenderConfig) -> String {
    let body = task
        .tokens()
        .iter()
        .map(|token| token.to_html(config))
        .filter(|html| !html.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let classes = class_list(task, config);
    let element = &config.element;
    if classes.is_empty() {
        format!("<{element}>{body}</{element}>")
    } else {
        format!(
            "<{element} class=\"{}\">{body}</{element}>",
            classes.join(" ")
        )
    }
}

/// CSS classes of the wrapping element, in output order.
pub fn class_list(task: &Task, config: &RenderConfig) -> Vec<String> {
    let mut classes = Vec::new();

    if !config.html_class.is_empty() {
        classes.push(config.html_class.clone());
    }

    if config.include_priority_class {
        if let Some(priority) = task.priority() {
            classes.push(format!(
                "priority-{}",
                priority.letter().to_ascii_lowercase()
            ));
        }
    }

    for (property, class) in &config.property_classes {
        if task.flag(property) == Some(true) {
            classes.push(class.clone());
        }
    }

    let contexts = task.contexts();
    for (context, class) in &config.context_classes {
        if contexts.contains(context) {
            classes.push(class.clone());
        }
    }

    let projects = task.projects();
    for (project, class) in &config.project_classes {
        if projects.contains(project) {
            classes.push(class.clone());
        }
    }

    classes
}
