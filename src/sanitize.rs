#[must_use]
pub fn sanitize(input: &str) -> String {
    ammonia::clean(input)
}
