//! `rollout colors list|set|reset`

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::Category;
use crate::cli::{load_context, Session};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::theme::CategoryColors;

pub struct SetOptions {
    pub category: String,
    pub color: String,
    pub session: Session,
}

#[derive(Serialize)]
struct ColorsOutput {
    colors: BTreeMap<String, String>,
}

impl ColorsOutput {
    fn new(colors: &CategoryColors) -> Self {
        Self {
            colors: colors
                .iter()
                .map(|(category, color)| (category.to_string(), color.to_string()))
                .collect(),
        }
    }
}

fn push_colors(human: &mut HumanOutput, colors: &CategoryColors) {
    for (category, color) in colors.iter() {
        human.push_summary(category, color);
    }
}

pub fn run_list(session: Session) -> Result<()> {
    let ctx = load_context(&session)?;
    let colors = ctx.state.colors();

    let mut human = HumanOutput::new("Category colors");
    push_colors(&mut human, colors);

    emit_success(session.output(), "colors list", &ColorsOutput::new(colors), Some(&human))
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let category: Category = options.category.parse()?;
    let mut ctx = load_context(&options.session)?;
    let color = ctx.state.set_category_color(category, &options.color)?;
    ctx.save_colors()?;

    let mut human = HumanOutput::new("Color updated");
    human.push_summary(category.as_str(), color);

    emit_success(
        options.session.output(),
        "colors set",
        &ColorsOutput::new(ctx.state.colors()),
        Some(&human),
    )
}

pub fn run_reset(session: Session) -> Result<()> {
    let mut ctx = load_context(&session)?;
    ctx.state.reset_category_colors();
    ctx.save_colors()?;

    let mut human = HumanOutput::new("Colors reset");
    push_colors(&mut human, ctx.state.colors());

    emit_success(
        session.output(),
        "colors reset",
        &ColorsOutput::new(ctx.state.colors()),
        Some(&human),
    )
}
