//! Execution order inspection command.

use super::common::PlanArgs;
use clap::Args;
use forma_shapes::decomposition_graph;

#[derive(Args)]
pub struct OrderArgs {
    #[command(flatten)]
    plan: PlanArgs,
}

pub fn run(args: OrderArgs) -> anyhow::Result<()> {
    let job = args.plan.job()?;
    job.validate()?;

    let sample_rate = f64::from(job.sample_rate);
    for plan in job.to_plans() {
        let graph = decomposition_graph(&plan, &[], sample_rate, job.window)?;
        println!("{} ({} leaves, window {})", plan.label(), graph.len(), job.window);
        for (step, path) in graph.execution_order().into_iter().enumerate() {
            println!("  {step:>3}  {path}");
        }
        println!();
    }
    Ok(())
}
