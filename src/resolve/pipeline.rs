use super::decoder::decode;
use super::redirect::{ProbeError, RedirectResolver};
use super::types::ResolutionOutcome;

/// Resolves one URL: offline decoding first, then a live redirect probe.
///
/// The probe only runs when decoding produced a different URL. Links that
/// decode to themselves are reported as already final without touching the
/// network, which keeps plain article links in a feed free of round trips.
///
/// If the candidate's host answers but the chain ends on a non-2xx status
/// (publishers often refuse `HEAD` with 403 or 405), the decoded URL is
/// still the best answer and is reported as resolved. Any other probe
/// failure degrades to the input: the outcome is unsuccessful and `resolved`
/// is the original URL.
pub async fn resolve_single(resolver: &RedirectResolver, url: &str) -> ResolutionOutcome {
    if url.trim().is_empty() {
        return ResolutionOutcome::failed(url, "Feed item has no link");
    }

    let decoded = decode(url);
    if decoded == url {
        tracing::trace!(url = %url, "Nothing to decode, skipping redirect probe");
        return ResolutionOutcome::unchanged(url);
    }

    match resolver.probe(&decoded).await {
        Ok(terminal) => ResolutionOutcome::resolved(url, terminal),
        Err(ProbeError::HttpStatus(status)) => {
            tracing::debug!(
                url = %url,
                candidate = %decoded,
                status = status,
                "Candidate answered with non-success status, keeping decoded link"
            );
            ResolutionOutcome::resolved(url, decoded)
        }
        Err(e) => {
            tracing::warn!(
                url = %url,
                candidate = %decoded,
                error = %e,
                "Could not resolve decoded link"
            );
            ResolutionOutcome::failed(url, e.to_string())
        }
    }
}
