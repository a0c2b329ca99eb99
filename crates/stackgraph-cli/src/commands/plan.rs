//! `stackgraph plan`: print the resolved construction order.

use std::fmt::Write as _;

use serde_json::json;
use stackgraph_adapters::discover;
use stackgraph_core::application::{PlanReport, PlanService};

use crate::{
    cli::{OutputFormat, PlanArgs, PlanFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: PlanArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let plan_path = args.plan.or(config.synth.plan);
    let service = PlanService::new(discover(plan_path.as_deref()));
    let report = service.report(&service.load()?)?;

    let format = if output.format() == OutputFormat::Json {
        PlanFormat::Json
    } else {
        args.format
    };

    match format {
        PlanFormat::Table => {
            output.header(&format!("Construction order ({})", report.source))?;
            output.data(&render_table(&report, &output))?;
        }
        PlanFormat::List => {
            for stack in &report.stacks {
                output.data(stack.id.as_str())?;
            }
        }
        PlanFormat::Json => output.json(&render_json(&report))?,
        PlanFormat::Csv => output.data(&render_csv(&report))?,
        PlanFormat::Dot => output.data(&render_dot(&report))?,
    }

    Ok(())
}

fn render_table(report: &PlanReport, output: &OutputManager) -> String {
    let width = report
        .stacks
        .iter()
        .map(|s| s.id.as_str().len())
        .max()
        .unwrap_or(0);

    let mut table = String::new();
    for stack in &report.stacks {
        let depends = if stack.depends_on.is_empty() {
            output.dim("-")
        } else {
            join(&stack.depends_on, ", ")
        };
        let _ = writeln!(
            table,
            "{:>3}. {:<width$}  {:<18} {depends}",
            stack.position,
            stack.id.as_str(),
            stack.kind.as_str(),
        );
    }
    table.trim_end().to_string()
}

fn render_json(report: &PlanReport) -> serde_json::Value {
    json!({
        "source": report.source,
        "stacks": report.stacks.iter().map(|s| json!({
            "position": s.position,
            "id": s.id.as_str(),
            "kind": s.kind.as_str(),
            "depends_on": s.depends_on.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
    })
}

fn render_csv(report: &PlanReport) -> String {
    let mut csv = String::from("position,stack,kind,depends_on");
    for stack in &report.stacks {
        let _ = write!(
            csv,
            "\n{},{},{},{}",
            stack.position,
            stack.id,
            stack.kind.as_str(),
            join(&stack.depends_on, ";")
        );
    }
    csv
}

fn render_dot(report: &PlanReport) -> String {
    let mut dot = String::from("digraph stacks {\n  rankdir=LR;\n");
    for stack in &report.stacks {
        let _ = writeln!(dot, "  \"{}\";", stack.id);
    }
    for (dependency, dependent) in report.edges() {
        let _ = writeln!(dot, "  \"{dependency}\" -> \"{dependent}\";");
    }
    dot.push('}');
    dot
}

fn join(ids: &[stackgraph_core::domain::StackId], separator: &str) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackgraph_adapters::BuiltinPlanSource;

    fn canonical_report() -> PlanReport {
        let service = PlanService::new(Box::new(BuiltinPlanSource::new()));
        service.report(&service.load().unwrap()).unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_stack() {
        let csv = render_csv(&canonical_report());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "position,stack,kind,depends_on");
        assert_eq!(lines.len(), 9);
        assert!(lines[1].starts_with("1,Ecr,registry,"));
    }

    #[test]
    fn dot_contains_every_edge() {
        let report = canonical_report();
        let dot = render_dot(&report);
        assert!(dot.starts_with("digraph stacks {"));
        assert!(dot.contains("\"Vpc\" -> \"Cluster\";"));
        assert!(dot.contains("\"Nlb\" -> \"Api\";"));
        assert_eq!(dot.matches("->").count(), report.edges().len());
    }

    #[test]
    fn json_lists_stacks_in_order() {
        let json = render_json(&canonical_report());
        let ids: Vec<&str> = json["stacks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.first(), Some(&"Ecr"));
        assert_eq!(ids.last(), Some(&"Api"));
        assert_eq!(json["source"], "built-in plan");
    }
}
