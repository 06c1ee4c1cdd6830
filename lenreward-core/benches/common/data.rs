use lenreward::RewardInput;

/// Deterministic batch of `n` math responses; roughly two in three correct,
/// lengths spread between 200 and ~3000 chars.
pub fn math_batch(n: usize) -> Vec<RewardInput> {
    (0..n)
        .map(|i| {
            let answer = if i % 3 == 0 { "41" } else { "42" };
            let mut response = format!("<think>step {}</think> so \\boxed{{{}}}", i, answer);
            let target = 200 + (i * 37) % 2800;
            while response.len() < target {
                response.push_str(" more reasoning");
            }
            RewardInput::new(response, "42")
        })
        .collect()
}
