//! Agrilearn CLI - author learning plans and track step progress.

use std::path::PathBuf;
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use agrilearn_core::{Category, LearningPlan, PlanDraft, PlanId, Step};
use agrilearn_progress::{PlanService, PlanView, ProgressUpdate, SeedPolicy, ServiceConfig, StepState};
use agrilearn_storage::JsonStorage;

#[derive(Parser)]
#[command(name = "agrilearn")]
#[command(about = "Community farming learning plans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding plan data
    #[arg(long, env = "AGRILEARN_DATA_DIR", default_value = ".agrilearn", global = true)]
    data_dir: PathBuf,

    /// Initial state of the first step for plans without progress
    #[arg(long, env = "AGRILEARN_SEED", default_value = "first-available", global = true)]
    seed: SeedPolicy,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new learning plan
    Create {
        /// Plan title
        #[arg(long)]
        title: String,
        /// Category (organic, seasonal, composting, irrigation)
        #[arg(long)]
        category: Category,
        /// Duration, e.g. "4 weeks"
        #[arg(long, default_value = "")]
        duration: String,
        /// Author name
        #[arg(long)]
        author: String,
        /// Learning outcome (repeatable)
        #[arg(long = "learn")]
        learn: Vec<String>,
        /// Step as "Title::Description" (repeatable, in order)
        #[arg(long = "step", required = true)]
        steps: Vec<String>,
    },
    /// Edit an existing plan; omitted fields are kept
    Edit(EditArgs),
    /// List plans
    List,
    /// Show plan details and step states
    Show {
        /// Plan ID
        id: PlanId,
    },
    /// Mark a step complete
    Complete {
        /// Plan ID
        id: PlanId,
        /// Step number, starting at 1
        step: usize,
    },
    /// Mark a step incomplete (re-locks later steps)
    Uncomplete {
        /// Plan ID
        id: PlanId,
        /// Step number, starting at 1
        step: usize,
    },
    /// Flip a step between complete and incomplete
    Toggle {
        /// Plan ID
        id: PlanId,
        /// Step number, starting at 1
        step: usize,
    },
    /// Mark a plan as finished
    Finish {
        /// Plan ID
        id: PlanId,
    },
    /// Delete a plan and its progress
    Delete {
        /// Plan ID
        id: PlanId,
    },
}

#[derive(Args)]
struct EditArgs {
    /// Plan ID
    id: PlanId,
    /// New title
    #[arg(long)]
    title: Option<String>,
    /// New category
    #[arg(long)]
    category: Option<Category>,
    /// New duration
    #[arg(long)]
    duration: Option<String>,
    /// Replace learning outcomes (repeatable)
    #[arg(long = "learn", conflicts_with = "clear_learn")]
    learn: Vec<String>,
    /// Remove all learning outcomes
    #[arg(long)]
    clear_learn: bool,
    /// Replace steps (repeatable, "Title::Description")
    #[arg(long = "step")]
    steps: Vec<String>,
}

impl EditArgs {
    /// Overlay the given fields on a draft of the current plan.
    fn apply(self, mut draft: PlanDraft) -> PlanDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(duration) = self.duration {
            draft.duration = duration;
        }
        if self.clear_learn {
            draft.what_youll_learn.clear();
        } else if !self.learn.is_empty() {
            draft.what_youll_learn = self.learn;
        }
        if !self.steps.is_empty() {
            draft.steps = self.steps.iter().map(|s| parse_step(s)).collect();
        }
        draft
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let storage = JsonStorage::new(&cli.data_dir).await?;
    debug!("Using data directory {}", storage.root().display());
    let mut service = PlanService::new(storage).with_config(ServiceConfig { seed: cli.seed });

    match cli.command {
        Commands::Create { title, category, duration, author, learn, steps } => {
            let mut draft = PlanDraft::new(title, category).with_duration(duration);
            draft.what_youll_learn = learn;
            draft.steps = steps.iter().map(|s| parse_step(s)).collect();

            let plan = service.create_plan(draft, author).await?;
            println!("Created plan: {} - {}", plan.id, plan.title);
        }
        Commands::Edit(args) => {
            let id = args.id;
            let draft = args.apply(PlanDraft::from(&service.get_plan(id).await?));

            let plan = service.update_plan(id, draft).await?;
            println!("Updated plan: {} - {} ({}%)", plan.id, plan.title, plan.progress);
        }
        Commands::List => {
            let plans = service.list_plans().await?;
            println!("Learning plans ({})", plans.len());
            for plan in plans {
                println!("  {} | {:<17} | {:>3}% | {}",
                    plan.id,
                    plan.category.label(),
                    plan.progress,
                    plan.title,
                );
            }
        }
        Commands::Show { id } => {
            let view = service.open(id).await?;
            print_plan(&view);
        }
        Commands::Complete { id, step } => {
            let update = service.complete_step(id, step_index(step)?).await?;
            print_update(&update);
        }
        Commands::Uncomplete { id, step } => {
            let update = service.uncomplete_step(id, step_index(step)?).await?;
            print_update(&update);
        }
        Commands::Toggle { id, step } => {
            let update = service.toggle_step(id, step_index(step)?).await?;
            print_update(&update);
        }
        Commands::Finish { id } => {
            service.finish_plan(id).await?;
            println!("Congratulations! You have completed this learning plan.");
        }
        Commands::Delete { id } => {
            service.delete_plan(id).await?;
            println!("Deleted plan {}", id);
        }
    }

    Ok(())
}

/// Parse "Title::Description" into a step. The description is optional.
fn parse_step(s: &str) -> Step {
    match s.split_once("::") {
        Some((title, description)) => Step::new(title.trim(), description.trim()),
        None => Step::new(s.trim(), ""),
    }
}

fn step_index(step: usize) -> Result<usize> {
    match step.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("step numbers start at 1"),
    }
}

fn print_plan(view: &PlanView) {
    let plan: &LearningPlan = &view.plan;
    println!("{}", plan.title);
    println!("  {} | {} | by {} | created {}",
        plan.category.label(),
        if plan.duration.is_empty() { "-" } else { plan.duration.as_str() },
        plan.author,
        plan.created_at.format("%B %-d, %Y"),
    );
    if view.tracker.is_finished() {
        println!("  Finished - you can always revisit this plan");
    } else {
        println!("  Progress: {}% ({}/{} steps)",
            view.tracker.progress(),
            view.tracker.completed_count(),
            view.tracker.len(),
        );
    }

    if !plan.what_youll_learn.is_empty() {
        println!();
        println!("What you'll learn");
        for (i, point) in plan.what_youll_learn.iter().enumerate() {
            println!("  {}. {}", i + 1, point);
        }
    }

    println!();
    println!("Steps");
    for (i, step, state) in view.steps() {
        println!("  [{}] {}. {} ({})", state_marker(state), i + 1, step.title, state.as_str());
        if !step.description.is_empty() {
            println!("        {}", step.description);
        }
        if !step.images.is_empty() {
            println!("        ({} images)", step.images.len());
        }
    }
}

fn print_update(update: &ProgressUpdate) {
    let marks: String = update.status.iter().map(|done| if *done { 'x' } else { '.' }).collect();
    println!("Progress: {}% [{}]", update.progress, marks);
}

fn state_marker(state: StepState) -> char {
    match state {
        StepState::Completed => 'x',
        StepState::Available => ' ',
        StepState::Locked => '-',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step() {
        assert_eq!(parse_step("Dig :: Two spits deep"), Step::new("Dig", "Two spits deep"));
        assert_eq!(parse_step("Water"), Step::new("Water", ""));
    }

    #[test]
    fn test_step_index_is_one_based() {
        assert_eq!(step_index(1).unwrap(), 0);
        assert!(step_index(0).is_err());
    }

    #[test]
    fn test_cli_parses_create() {
        let cli = Cli::try_parse_from([
            "agrilearn", "--seed", "first-completed", "create",
            "--title", "Compost", "--category", "composting", "--author", "Ana",
            "--step", "Build bin", "--step", "Turn pile::Weekly",
        ])
        .unwrap();
        assert_eq!(cli.seed, SeedPolicy::FirstCompleted);
        match cli.command {
            Commands::Create { category, steps, .. } => {
                assert_eq!(category, Category::Composting);
                assert_eq!(steps.len(), 2);
            }
            _ => panic!("expected create"),
        }
    }

    fn current_draft() -> PlanDraft {
        PlanDraft::new("Compost", Category::Composting)
            .with_outcome("Hot composting")
            .with_outcome("Worm bins")
            .with_step(Step::new("Build bin", ""))
    }

    fn edit_args(args: &[&str]) -> EditArgs {
        let mut argv = vec!["agrilearn", "edit", "01ARZ3NDEKTSV4RRFFQ69G5FAV"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Edit(args) => args,
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_edit_keeps_outcomes_when_none_given() {
        let draft = edit_args(&["--title", "Compost 2"]).apply(current_draft());
        assert_eq!(draft.title, "Compost 2");
        assert_eq!(draft.what_youll_learn.len(), 2);
        assert_eq!(draft.steps.len(), 1);
    }

    #[test]
    fn test_edit_replaces_outcomes_and_steps() {
        let draft = edit_args(&["--learn", "Leaf mould", "--step", "A", "--step", "B::b"])
            .apply(current_draft());
        assert_eq!(draft.what_youll_learn, vec!["Leaf mould".to_string()]);
        assert_eq!(draft.steps, vec![Step::new("A", ""), Step::new("B", "b")]);
    }

    #[test]
    fn test_edit_clear_learn_removes_all_outcomes() {
        let draft = edit_args(&["--clear-learn"]).apply(current_draft());
        assert!(draft.what_youll_learn.is_empty());
        assert!(Cli::try_parse_from([
            "agrilearn", "edit", "01ARZ3NDEKTSV4RRFFQ69G5FAV", "--clear-learn", "--learn", "x",
        ])
        .is_err());
    }
}
