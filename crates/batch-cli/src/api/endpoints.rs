//! API endpoint URL builders

fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

pub fn models_url(base_url: &str) -> String {
    join(base_url, "/models")
}

pub fn model_url(base_url: &str, model_id: &str) -> String {
    join(base_url, &format!("/models/{}", model_id))
}

pub fn jobs_url(base_url: &str) -> String {
    join(base_url, "/jobs")
}

pub fn job_url(base_url: &str, job_id: &str) -> String {
    join(base_url, &format!("/jobs/{}", job_id))
}

pub fn rejected_rows_url(base_url: &str, job_id: &str) -> String {
    join(base_url, &format!("/jobs/{}/rejected", job_id))
}
