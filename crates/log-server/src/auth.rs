/// Attaches a bearer token to outbound interceptor-wrapped calls, or (here)
/// validates its presence on inbound ones. Mirrors `gazette::Interceptor`'s
/// header name and `Bearer ` prefix exactly; verifying the token's contents
/// is an authentication *mechanism* and stays out of scope (spec.md §1).
#[derive(Clone)]
pub struct Interceptor(Option<tonic::metadata::AsciiMetadataValue>);

impl Interceptor {
    /// `None` disables the check entirely (the default for the in-memory
    /// single-node mode).
    pub fn new(expected_bearer_token: Option<String>) -> Result<Self, tonic::Status> {
        let expected = match expected_bearer_token {
            Some(token) => Some(
                format!("Bearer {}", token)
                    .parse()
                    .map_err(|_| tonic::Status::invalid_argument("invalid bearer token"))?,
            ),
            None => None,
        };
        Ok(Self(expected))
    }
}

impl tonic::service::Interceptor for Interceptor {
    fn call(&mut self, request: tonic::Request<()>) -> Result<tonic::Request<()>, tonic::Status> {
        let Some(expected) = self.0.as_ref() else {
            return Ok(request);
        };
        match request.metadata().get("authorization") {
            Some(got) if got == expected => Ok(request),
            _ => Err(tonic::Status::unauthenticated("missing or invalid bearer token")),
        }
    }
}
