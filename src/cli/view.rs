//! Read-only views: dashboard, timeline, countdown, owners.

use crate::cli::{load_context, QueryArgs, Session};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::views::{self, CountdownKind};

pub struct ViewOptions {
    pub query: QueryArgs,
    pub session: Session,
}

pub fn run_dashboard(session: Session) -> Result<()> {
    let ctx = load_context(&session)?;
    let derived = ctx.state.derive();
    let dashboard = views::dashboard(&derived);

    let mut human = HumanOutput::new(format!("{} dashboard", ctx.config.plan.name));
    human.push_summary("Reference date", dashboard.reference.to_string());
    human.push_summary("Tasks", dashboard.total.to_string());
    human.push_summary(
        "Completed",
        format!("{} / {}", dashboard.completed, dashboard.total),
    );
    human.push_summary("Mean progress", format!("{}%", dashboard.mean_progress));
    for count in &dashboard.statuses {
        human.push_summary(count.status.to_string(), count.count.to_string());
    }
    for upcoming in &dashboard.upcoming {
        human.push_detail(format!(
            "{} starts {} (in {} days, {})",
            upcoming.label, upcoming.start, upcoming.days_until, upcoming.owner
        ));
    }

    emit_success(session.output(), "dashboard", &dashboard, Some(&human))
}

pub fn run_timeline(options: ViewOptions) -> Result<()> {
    let query = options.query.to_query()?;
    let ctx = load_context(&options.session)?;
    let derived = ctx.state.derive();
    let tasks = derived.filtered(&query);
    let timeline = views::timeline(&derived, &tasks, ctx.state.colors());

    let label_width = timeline
        .rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(32);

    let mut human = HumanOutput::new("Timeline");
    human.push_summary("Kickoff", ctx.state.epoch().to_string());
    human.push_summary("Span", format!("{} days", timeline.span_days));
    for row in &timeline.rows {
        let label: String = row.label.chars().take(label_width).collect();
        human.push_detail(format!(
            "{label:<label_width$} |{}| {:>3}% {}",
            row.bar, row.percent, row.status
        ));
    }

    emit_success(options.session.output(), "timeline", &timeline, Some(&human))
}

pub fn run_countdown(options: ViewOptions) -> Result<()> {
    let query = options.query.to_query()?;
    let ctx = load_context(&options.session)?;
    let derived = ctx.state.derive();
    let tasks = derived.filtered(&query);
    let rows = views::countdown(&derived, &tasks);

    let mut human = HumanOutput::new("Countdown");
    human.push_summary("Reference date", derived.reference.to_string());
    human.push_summary("Open tasks", rows.len().to_string());
    for row in &rows {
        let when = match row.kind {
            CountdownKind::StartsIn => format!("starts in {} days", row.days),
            CountdownKind::DueIn => format!("due in {} days", row.days),
            CountdownKind::Overdue => format!("overdue by {} days", row.days),
        };
        human.push_detail(format!("{} ({}): {when} [{}%]", row.label, row.owner, row.percent));
    }

    emit_success(options.session.output(), "countdown", &rows, Some(&human))
}

pub fn run_owners(options: ViewOptions) -> Result<()> {
    let query = options.query.to_query()?;
    let ctx = load_context(&options.session)?;
    let derived = ctx.state.derive();
    let tasks = derived.filtered(&query);
    let groups = views::owners(&derived, &tasks);

    let mut human = HumanOutput::new("Owners");
    for group in &groups {
        human.push_summary(
            group.owner.clone(),
            format!("{} tasks, {}% mean progress", group.count, group.mean_progress),
        );
        for task in &group.tasks {
            human.push_detail(format!(
                "{}: {} {} ({}%)",
                group.owner, task.status, task.label, task.percent
            ));
        }
    }

    emit_success(options.session.output(), "owners", &groups, Some(&human))
}
