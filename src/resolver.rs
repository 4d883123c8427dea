// Name resolution strategies.
// The dispatch runtime maps a member name to the function it forwards to
// through a Resolver; the generator shares the same contract so its
// advertised names follow the same rules.

/// A deterministic, total `name -> name` mapping.
pub trait Resolver {
    fn resolve(&self, function: &str) -> String;
}

/// Pass-through strategy: every name resolves to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsIs;

impl Resolver for AsIs {
    fn resolve(&self, function: &str) -> String {
        function.to_string()
    }
}

/// Look up a strategy by its CLI name.
pub fn by_name(name: &str) -> Option<Box<dyn Resolver>> {
    match name {
        "as-is" | "asis" => Some(Box::new(AsIs)),
        _ => None,
    }
}
