use crate::error::DataAccessError;
use crate::fetch::{HttpClient, fetch_json};
use crate::grading::AssignmentGroup;
use crate::store::{Enrollment, GradebookStore};
use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

/// Reads course data from an LMS JSON API.
///
/// Endpoints, relative to `base_url`:
/// - `GET courses/{course}/assignment-groups?studentId={student}`
/// - `GET courses/{course}/enrollments`
pub struct HttpStore<C> {
    client: C,
    base_url: Url,
}

impl<C: HttpClient> HttpStore<C> {
    pub fn new(client: C, base_url: &str) -> Result<Self, DataAccessError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DataAccessError::InvalidRequest(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DataAccessError::InvalidRequest(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl<C: HttpClient> GradebookStore for HttpStore<C> {
    #[tracing::instrument(skip(self))]
    async fn assignment_groups(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> Result<Vec<AssignmentGroup>, DataAccessError> {
        let mut url = self.endpoint(&["courses", course_id, "assignment-groups"]);
        url.query_pairs_mut().append_pair("studentId", student_id);

        let groups: Vec<AssignmentGroup> = fetch_json(&self.client, url.as_str()).await?;
        debug!(groups = groups.len(), "Fetched assignment groups");
        Ok(groups)
    }

    async fn enrollments(&self, course_id: &str) -> Result<Vec<Enrollment>, DataAccessError> {
        let url = self.endpoint(&["courses", course_id, "enrollments"]);
        fetch_json(&self.client, url.as_str()).await
    }
}
