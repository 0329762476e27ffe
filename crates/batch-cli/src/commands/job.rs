//! `batch job` commands

use super::print_response;
use crate::api::ApiClient;
use crate::error::Result;
use crate::JobCommand;

pub async fn run(api_url: &str, command: &JobCommand) -> Result<()> {
    let client = ApiClient::new(api_url)?;

    let response = match command {
        JobCommand::List => client.list_jobs().await?,
        JobCommand::Create { model_id, file } => client.create_job(model_id, file).await?,
        JobCommand::Status { job_id } => client.get_job(job_id).await?,
        JobCommand::Cancel { job_id } => client.cancel_job(job_id).await?,
        JobCommand::Rejected { job_id } => client.rejected_rows(job_id).await?,
    };

    print_response(response)
}
