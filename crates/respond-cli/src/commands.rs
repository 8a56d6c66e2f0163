//! Command handlers for CLI subcommands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use respond_engine::{default_config_path, ResponseEngine};
use respond_models::{
    AssignmentDetail, AssignmentMap, CommunicationPlan, CrowdDistribution, EvacuationPlan,
    IncidentId, Location,
};
use respond_persistence::{atomic_write, load_crowd, load_layout, load_scenario, Scenario};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Combined output of `respond plan`.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub assignments: AssignmentMap,
    pub details: Vec<AssignmentDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evacuation: Option<EvacuationPlan>,
    pub communication: CommunicationPlan,
}

/// Execute a CLI command.
pub fn execute(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    let format = cli.format;

    let rendered = match cli.command {
        Commands::Optimize { scenario } => cmd_optimize(config, &scenario, format)?,
        Commands::Details { scenario } => cmd_details(config, &scenario, format)?,
        Commands::Evacuate { layout, at, crowd } => {
            cmd_evacuate(config, &layout, at, &crowd, format)?
        }
        Commands::Notify { scenario, incident } => {
            cmd_notify(config, &scenario, &incident, format)?
        }
        Commands::Plan {
            scenario,
            incident,
            layout,
            crowd,
        } => cmd_plan(
            config,
            &scenario,
            &incident,
            layout.as_deref(),
            crowd.as_deref(),
            format,
        )?,
        Commands::Config => cmd_config(config, format)?,
    };

    write_output(&rendered, cli.output.as_deref())
}

fn write_output(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            atomic_write(path, rendered.as_bytes())?;
            info!(path = %path.display(), "output written");
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Builds an engine and loads a scenario into it.
fn load_engine(config: Option<&Path>, scenario_path: &Path) -> Result<(ResponseEngine, Scenario)> {
    let engine = ResponseEngine::from_config_file(config)?;
    let scenario = load_scenario(scenario_path)?;

    let report = engine.ingest_json(&scenario);
    for rejected in report
        .incidents
        .rejected
        .iter()
        .chain(report.resources.rejected.iter())
    {
        warn!(
            index = rejected.index,
            id = rejected.id.as_deref().unwrap_or("?"),
            error = %rejected.error,
            "skipped scenario item"
        );
    }

    Ok((engine, scenario))
}

fn cmd_optimize(config: Option<&Path>, scenario: &Path, format: OutputFormat) -> Result<String> {
    let (engine, _) = load_engine(config, scenario)?;
    let assignments = engine.optimize_assignments()?;

    match format {
        OutputFormat::Json => to_json(&assignments),
        OutputFormat::Table => Ok(render_assignments(&assignments)),
    }
}

fn cmd_details(config: Option<&Path>, scenario: &Path, format: OutputFormat) -> Result<String> {
    let (engine, _) = load_engine(config, scenario)?;
    engine.optimize_assignments()?;
    let details = engine.assignment_details();

    match format {
        OutputFormat::Json => to_json(&details),
        OutputFormat::Table => Ok(render_details(&details)),
    }
}

fn cmd_evacuate(
    config: Option<&Path>,
    layout: &Path,
    at: Location,
    crowd: &Path,
    format: OutputFormat,
) -> Result<String> {
    let engine = ResponseEngine::from_config_file(config)?;
    let layout = load_layout(layout)?;
    let crowd = load_crowd(crowd)?;

    let plan = engine.plan_evacuation(&layout, at, &crowd);

    match format {
        OutputFormat::Json => to_json(&plan),
        OutputFormat::Table => Ok(render_evacuation(&plan)),
    }
}

fn cmd_notify(
    config: Option<&Path>,
    scenario: &Path,
    incident: &str,
    format: OutputFormat,
) -> Result<String> {
    let (engine, _) = load_engine(config, scenario)?;
    engine.optimize_assignments()?;
    let plan = engine.communication_plan_for(&IncidentId::from(incident))?;

    match format {
        OutputFormat::Json => to_json(&plan),
        OutputFormat::Table => Ok(render_communication(&plan)),
    }
}

fn cmd_plan(
    config: Option<&Path>,
    scenario_path: &Path,
    incident: &str,
    layout: Option<&Path>,
    crowd: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    let (engine, scenario) = load_engine(config, scenario_path)?;
    let incident_id = IncidentId::from(incident);

    let assignments = engine.optimize_assignments()?;
    let details = engine.assignment_details();

    let layout = match layout {
        Some(path) => Some(load_layout(path)?),
        None => scenario.layout,
    };
    let crowd = match crowd {
        Some(path) => load_crowd(path)?,
        None => scenario.crowd.unwrap_or_else(CrowdDistribution::new),
    };
    let evacuation = match &layout {
        Some(layout) => Some(engine.plan_evacuation_for(&incident_id, layout, &crowd)?),
        None => {
            warn!("no venue layout given, skipping evacuation plan");
            None
        }
    };
    let communication = engine.communication_plan_for(&incident_id)?;

    let report = PlanReport {
        assignments,
        details,
        evacuation,
        communication,
    };

    match format {
        OutputFormat::Json => to_json(&report),
        OutputFormat::Table => Ok(render_plan(&report)),
    }
}

fn cmd_config(config: Option<&Path>, format: OutputFormat) -> Result<String> {
    let path: PathBuf = config
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let engine = ResponseEngine::from_config_file(Some(&path))?;
    let json = to_json(engine.config())?;

    match format {
        OutputFormat::Json => Ok(json),
        OutputFormat::Table => {
            let source = if path.exists() { "" } else { " (not found, defaults)" };
            Ok(format!("Config file: {}{}\n\n{}", path.display(), source, json))
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

// ── table rendering ─────────────────────────────────────────────────────

fn render_assignments(assignments: &AssignmentMap) -> String {
    let mut out = String::new();
    if assignments.is_empty() {
        out.push_str("No feasible assignments.\n");
        return out;
    }

    let _ = writeln!(out, "{:<20}  INCIDENT", "RESOURCE");
    let _ = writeln!(out, "{}", "-".repeat(44));
    for (resource_id, incident_id) in assignments {
        let _ = writeln!(out, "{:<20}  {}", truncate(resource_id.as_str(), 20), incident_id);
    }
    let _ = writeln!(out, "\n{} assignment(s)", assignments.len());
    out
}

fn render_details(details: &[AssignmentDetail]) -> String {
    let mut out = String::new();
    if details.is_empty() {
        out.push_str("No feasible assignments.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<16}  {:<18}  {:<16}  {:<8}  {:<8}  {:>3}  {:>8}  {:>8}",
        "RESOURCE", "TYPE", "INCIDENT", "TYPE", "SEVERITY", "PRI", "ETA(s)", "COST"
    );
    let _ = writeln!(out, "{}", "-".repeat(100));
    for d in details {
        let _ = writeln!(
            out,
            "{:<16}  {:<18}  {:<16}  {:<8}  {:<8}  {:>3}  {:>8.0}  {:>8.2}",
            truncate(d.resource_id.as_str(), 16),
            d.resource_kind.as_str(),
            truncate(d.incident_id.as_str(), 16),
            d.incident_kind.as_str(),
            d.severity.as_str(),
            d.priority,
            d.estimated_response_seconds,
            d.cost
        );
    }
    let _ = writeln!(out, "\n{} assignment(s)", details.len());
    out
}

fn render_evacuation(plan: &EvacuationPlan) -> String {
    let mut out = String::new();
    let affected: Vec<&str> = plan.affected_zones.iter().map(|z| z.as_str()).collect();
    let _ = writeln!(
        out,
        "Affected zones: {}",
        if affected.is_empty() {
            "none".to_string()
        } else {
            affected.join(", ")
        }
    );
    let _ = writeln!(out, "Estimated evacuation time: {:.0}s", plan.estimated_seconds);

    if !plan.routes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<12}  {:<12}  {:<10}  {:>8}  INSTRUCTIONS",
            "ZONE", "EXIT", "DIRECTION", "DISTANCE"
        );
        let _ = writeln!(out, "{}", "-".repeat(90));
        for route in &plan.routes {
            let _ = writeln!(
                out,
                "{:<12}  {:<12}  {:<10}  {:>8.1}  {}",
                truncate(route.zone_id.as_str(), 12),
                truncate(route.exit_id.as_str(), 12),
                route.direction.to_string(),
                route.distance,
                route.instructions
            );
        }
    }

    if !plan.exit_loads.is_empty() {
        let _ = writeln!(out, "\nExit load:");
        for load in &plan.exit_loads {
            let _ = writeln!(
                out,
                "  {}: {} people at {:.2}/s = {:.0}s",
                load.exit_id, load.assigned_people, load.throughput, load.seconds
            );
        }
    }

    if !plan.unassigned_zones.is_empty() {
        let zones: Vec<&str> = plan.unassigned_zones.iter().map(|z| z.as_str()).collect();
        let _ = writeln!(out, "\nUnassigned zones: {}", zones.join(", "));
    }

    let _ = writeln!(out, "\nRecommendations:");
    for rec in &plan.recommendations {
        let _ = writeln!(out, "  - {}", rec);
    }
    out
}

fn render_communication(plan: &CommunicationPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Incident: {}", plan.incident_id);

    let _ = writeln!(out, "\nTimeline:");
    for entry in &plan.timeline {
        let _ = writeln!(
            out,
            "  +{:>4}s  {}  {:<20}  {:<20}  P{}",
            entry.offset_seconds,
            entry.scheduled_at.format("%H:%M:%S"),
            entry.audience.to_string(),
            entry.channel.to_string(),
            entry.priority
        );
        let _ = writeln!(out, "          {}", entry.message);
    }

    let _ = writeln!(out, "\nContacts:");
    for contact in &plan.contacts {
        let phone = contact
            .phone
            .as_deref()
            .map(|p| format!(" ({})", p))
            .unwrap_or_default();
        let _ = writeln!(out, "  P{}  {}{}", contact.priority, contact.name, phone);
    }
    out
}

fn render_plan(report: &PlanReport) -> String {
    let mut out = String::from("== Assignments ==\n");
    out.push_str(&render_details(&report.details));
    if let Some(evacuation) = &report.evacuation {
        out.push_str("\n== Evacuation ==\n");
        out.push_str(&render_evacuation(evacuation));
    }
    out.push_str("\n== Notifications ==\n");
    out.push_str(&render_communication(&report.communication));
    out
}

/// Truncates a string to max_len characters, adding "..." if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    const SCENARIO: &str = r#"{
        "incidents": [
            {"id": "inc-med", "type": "medical", "location": {"x": 110.0, "y": 205.0},
             "severity": "high", "priority": 1, "estimated_response_seconds": 300},
            {"id": "inc-fire", "type": "fire", "location": {"x": 290.0, "y": 240.0},
             "severity": "critical", "priority": 1, "estimated_response_seconds": 180}
        ],
        "resources": [
            {"id": "amb-1", "type": "ambulance", "location": {"x": 100.0, "y": 200.0}},
            {"id": "truck-1", "type": "fire_truck", "location": {"x": 300.0, "y": 250.0}},
            {"id": "bad", "type": "hovercraft", "location": {"x": 0.0, "y": 0.0}}
        ],
        "layout": {
            "exits": [{"id": "E1", "name": "North Gate", "location": {"x": 300.0, "y": 300.0}, "capacity": 500}],
            "zones": [{"id": "Z1", "center": {"x": 280.0, "y": 250.0}, "capacity": 600}]
        },
        "crowd": {"Z1": 120}
    }"#;

    fn run(dir: &Path, args: &[&str]) -> String {
        let out = dir.join("out.txt");
        let config = dir.join("config.json");
        let mut argv = vec!["respond", "--config", config.to_str().unwrap(), "-o", out.to_str().unwrap()];
        argv.extend_from_slice(args);

        execute(Cli::parse_from(argv)).unwrap();
        fs::read_to_string(out).unwrap()
    }

    fn scenario_file(dir: &Path) -> PathBuf {
        let path = dir.join("scenario.json");
        fs::write(&path, SCENARIO).unwrap();
        path
    }

    #[test]
    fn test_optimize_json() {
        let dir = tempdir().unwrap();
        let scenario = scenario_file(dir.path());

        let out = run(dir.path(), &["--format", "json", "optimize", scenario.to_str().unwrap()]);
        let map: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(map["amb-1"], "inc-med");
        assert_eq!(map["truck-1"], "inc-fire");
        assert!(map.get("bad").is_none());
    }

    #[test]
    fn test_details_table() {
        let dir = tempdir().unwrap();
        let scenario = scenario_file(dir.path());

        let out = run(dir.path(), &["details", scenario.to_str().unwrap()]);
        assert!(out.starts_with("RESOURCE"));
        assert!(out.contains("fire_truck"));
        assert!(out.contains("2 assignment(s)"));
    }

    #[test]
    fn test_notify_table() {
        let dir = tempdir().unwrap();
        let scenario = scenario_file(dir.path());

        let out = run(dir.path(), &["notify", scenario.to_str().unwrap(), "--incident", "inc-fire"]);
        assert!(out.contains("Incident: inc-fire"));
        assert!(out.contains("public_announcement"));
        assert!(out.contains("Emergency Services (911)"));
        assert!(out.contains("Resource truck-1"));
        assert!(!out.contains("Resource amb-1"));
    }

    #[test]
    fn test_notify_unknown_incident_fails() {
        let dir = tempdir().unwrap();
        let scenario = scenario_file(dir.path());
        let config = dir.path().join("config.json");

        let cli = Cli::parse_from([
            "respond",
            "--config",
            config.to_str().unwrap(),
            "notify",
            scenario.to_str().unwrap(),
            "-i",
            "ghost",
        ]);
        let err = execute(cli).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_plan_uses_embedded_layout() {
        let dir = tempdir().unwrap();
        let scenario = scenario_file(dir.path());

        let out = run(
            dir.path(),
            &["-f", "json", "plan", scenario.to_str().unwrap(), "-i", "inc-fire"],
        );
        let report: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["assignments"]["truck-1"], "inc-fire");
        assert_eq!(report["evacuation"]["affected_zones"][0], "Z1");
        assert_eq!(report["evacuation"]["estimated_seconds"], 60.0);
        assert_eq!(report["communication"]["timeline"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_evacuate_table() {
        let dir = tempdir().unwrap();
        let layout = dir.path().join("venue.json");
        let crowd = dir.path().join("crowd.json");
        fs::write(
            &layout,
            r#"{"exits": [{"id": "E1", "location": {"x": 0.0, "y": 0.0}, "capacity": 500}],
                "zones": [{"id": "Z1", "center": {"x": 110.0, "y": 105.0}},
                          {"id": "Z2", "center": {"x": 500.0, "y": 500.0}}]}"#,
        )
        .unwrap();
        fs::write(&crowd, r#"{"Z1": 400, "Z2": 300}"#).unwrap();

        let out = run(
            dir.path(),
            &[
                "evacuate",
                layout.to_str().unwrap(),
                "--at",
                "100,100",
                "--crowd",
                crowd.to_str().unwrap(),
            ],
        );
        assert!(out.contains("Affected zones: Z1\n"));
        assert!(out.contains("Estimated evacuation time: 200s"));
        assert!(out.contains("Southwest"));
        assert!(out.contains("Proceed to Exit E1 via the shortest safe route"));
    }

    #[test]
    fn test_config_reports_defaults() {
        let dir = tempdir().unwrap();
        let out = run(dir.path(), &["--format", "json", "config"]);
        let config: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(config["scheduler"]["staff_delay_secs"], 30);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ambulance-north-7", 10), "ambulan...");
    }
}
