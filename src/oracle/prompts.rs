use super::{HistoryEntry, Plan};

// Prompt assembly for the planning oracles. The catalog is the rendered
// tool list from `tools::catalog_lines`; the snapshot comes from
// `WorldSnapshot::render_for_prompt`.

const PLANNING_RULES: &str = "For the given objective, come up with a simple step by step plan. \
Make sure to familiarize yourself with the starting situation. \
This plan should involve individual tool uses, that if executed correctly will result in the \
stated objective. Do not add any superfluous steps. \
If there is input needed for some steps, make sure to gather it with previous steps. \
After the final step, the objective should have been achieved. Make sure that each step has \
all the information needed - do not skip steps.";

pub fn planner_prompt(objective: &str, catalog: &str, snapshot: &str) -> String {
    format!(
        "{PLANNING_RULES}\n\n\
The following tools are available to you to retrieve data and run actions:\n\
{catalog}\n\n\
{snapshot}\n\n\
Objective:\n{objective}\n\n\
Respond with a JSON object of the form {{\"steps\": [\"step one\", \"step two\"]}} where the \
steps are in sorted order. Respond with JSON only."
    )
}

pub fn replanner_prompt(
    objective: &str,
    plan: &Plan,
    history: &[HistoryEntry],
    catalog: &str,
    snapshot: &str,
) -> String {
    let past_steps = history
        .iter()
        .map(HistoryEntry::rendered)
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{PLANNING_RULES}\n\n\
Your objective was this:\n{objective}\n\n\
Your original plan was this:\n{}\n\n\
You have currently done the follow steps:\n{past_steps}\n\n\
The following tools are available to you to retrieve data and run actions:\n\
{catalog}\n\n\
{snapshot}\n\n\
Update your plan accordingly. If no more steps are needed and you can return to the user, \
respond with a JSON object of the form {{\"response\": \"answer for the user\"}}. \
Otherwise respond with a JSON object of the form {{\"steps\": [\"next step\"]}}. \
Only add steps to the plan that still NEED to be done. Do not return previously done steps \
as part of the plan. Respond with JSON only.",
        plan.joined()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planner_prompt_contains_objective_and_catalog() {
        let prompt = planner_prompt("Fight a chicken", "fight: Start a fight", "No maps are loaded.");
        assert!(prompt.contains("Objective:\nFight a chicken"));
        assert!(prompt.contains("fight: Start a fight"));
        assert!(prompt.contains("No maps are loaded."));
    }

    #[test]
    fn replanner_prompt_lists_past_steps() {
        let plan = Plan::from_steps(["fight the chicken".to_string()]);
        let history = vec![HistoryEntry {
            step: "move to 0,1".into(),
            result: "move completed".into(),
        }];
        let prompt = replanner_prompt("Fight a chicken", &plan, &history, "", "");
        assert!(prompt.contains("move to 0,1: move completed"));
        assert!(prompt.contains("fight the chicken"));
        assert!(prompt.contains("Do not return previously done steps"));
    }
}
