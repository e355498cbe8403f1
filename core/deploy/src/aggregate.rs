//! All-or-nothing aggregation of upload results.

use tracing::debug;

use ovhdeploy_common::Result;

/// Collapse settled upload results into a single outcome.
///
/// Returns every uploaded path when all uploads succeeded, otherwise the
/// first failure. Uploads that did succeed are left in place but not
/// reported.
pub fn aggregate(settled: Vec<Result<String>>) -> Result<Vec<String>> {
    let mut uploaded = Vec::with_capacity(settled.len());
    let mut first_error = None;

    for result in settled {
        match result {
            Ok(path) => uploaded.push(path),
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(err) => debug!("Additional upload failure: {}", err),
        }
    }

    match first_error {
        Some(err) => {
            if !uploaded.is_empty() {
                debug!(
                    "{} file(s) were uploaded before the deploy failed; they are not rolled back",
                    uploaded.len()
                );
            }
            Err(err)
        }
        None => Ok(uploaded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovhdeploy_common::{Error, UploadFailure};

    fn failure(path: &str, status: u16) -> Result<String> {
        Err(Error::Upload {
            path: path.to_string(),
            cause: UploadFailure::Status(status),
        })
    }

    #[test]
    fn test_all_success() {
        let outcome = aggregate(vec![Ok("a.js".to_string()), Ok("b.js".to_string())]).unwrap();
        assert_eq!(outcome, vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_single_failure_fails_everything() {
        let outcome = aggregate(vec![
            Ok("a.js".to_string()),
            failure("b.js", 500),
            Ok("c.js".to_string()),
        ]);

        assert!(matches!(outcome, Err(Error::Upload { path, .. }) if path == "b.js"));
    }

    #[test]
    fn test_failure_does_not_report_partial_uploads() {
        let outcome = aggregate(vec![Ok("a.js".to_string()), failure("b.js", 403)]);

        match outcome {
            Err(Error::Upload { path, .. }) => assert_eq!(path, "b.js"),
            other => panic!("expected upload failure, got {:?}", other),
        }
    }

    #[test]
    fn test_first_failure_wins() {
        let outcome = aggregate(vec![failure("a.js", 403), failure("b.js", 500)]);
        assert!(matches!(
            outcome,
            Err(Error::Upload { cause: UploadFailure::Status(403), .. })
        ));
    }

    #[test]
    fn test_empty_plan() {
        assert!(aggregate(Vec::new()).unwrap().is_empty());
    }
}
