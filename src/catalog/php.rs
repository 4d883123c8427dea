// Live catalog: ask a PHP binary for its internal functions.
// The binary runs a reflection script that prints a JSON catalog document
// (see `json.rs`); each `names()` call re-runs it, so every enumeration
// reflects the current installation.

use super::{CatalogSource, JsonCatalog, ParameterDescriptor};
use crate::error::{GenerateError, Result};
use crate::trace::trace;
use std::cell::RefCell;
use std::process::Command;

const REFLECT_SCRIPT: &str = r#"
$fmt = function ($v) {
    if ($v === null) { return 'null'; }
    if (is_array($v)) { return $v === [] ? '[]' : preg_replace('/\s+/', ' ', var_export($v, true)); }
    return var_export($v, true);
};
$out = [];
foreach (get_defined_functions()['internal'] ?? [] as $fn) {
    try {
        $r = new ReflectionFunction($fn);
        $params = [];
        foreach ($r->getParameters() as $p) {
            $default = null;
            if ($p->isDefaultValueAvailable()) {
                $default = $p->isDefaultValueConstant()
                    ? $p->getDefaultValueConstantName()
                    : $fmt($p->getDefaultValue());
            }
            $params[] = [
                'name' => $p->getName(),
                'required' => !$p->isOptional(),
                'default' => $default,
                'type' => $p->hasType() ? (string) $p->getType() : null,
                'by_reference' => $p->isPassedByReference(),
                'variadic' => $p->isVariadic(),
            ];
        }
        $out[] = ['name' => $fn, 'parameters' => $params];
    } catch (Throwable $e) {
        $out[] = ['name' => $fn, 'error' => $e->getMessage()];
    }
}
echo json_encode(['functions' => $out]);
"#;

pub struct PhpRuntimeCatalog {
    binary: String,
    snapshot: RefCell<Option<JsonCatalog>>,
}

impl PhpRuntimeCatalog {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into(), snapshot: RefCell::new(None) }
    }

    fn dump(&self) -> Result<JsonCatalog> {
        trace(&format!("php catalog: running `{} -r <reflect>`", self.binary));
        let output = Command::new(&self.binary)
            .arg("-r")
            .arg(REFLECT_SCRIPT)
            .output()
            .map_err(|e| GenerateError::Enumeration(format!("failed to run `{}`: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(GenerateError::Enumeration(format!(
                "`{}` exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| GenerateError::Enumeration(format!("reflection output is not UTF-8: {}", e)))?;
        JsonCatalog::parse(&stdout)
    }
}

impl CatalogSource for PhpRuntimeCatalog {
    fn names(&self) -> Result<Vec<String>> {
        let catalog = self.dump()?;
        trace(&format!("php catalog: {} internal functions", catalog.len()));
        let names = catalog.names()?;
        *self.snapshot.borrow_mut() = Some(catalog);
        Ok(names)
    }

    fn reflect(&self, name: &str) -> Result<Vec<ParameterDescriptor>> {
        match self.snapshot.borrow().as_ref() {
            Some(catalog) => catalog.reflect(name),
            None => Err(GenerateError::reflection(name, "catalog has not been enumerated")),
        }
    }
}
