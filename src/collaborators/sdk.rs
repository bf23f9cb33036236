//! Client SDK generation.
//!
//! Generates a small client class per requested language with one method
//! per discovered API. Package names follow each language's convention,
//! derived from a single base name (`enterprise-api-client` by default).

use std::collections::BTreeMap;
use std::fmt::Write;

use super::{CollaboratorError, CollaboratorErrorKind};
use crate::flow::artifacts::{DiscoveredItem, SdkBundle};

/// Languages the generator can emit.
pub const SUPPORTED_LANGUAGES: [&str; 4] = ["python", "javascript", "typescript", "java"];

pub const DEFAULT_LANGUAGES: [&str; 2] = ["python", "javascript"];

pub const DEFAULT_PACKAGE_NAME: &str = "enterprise-api-client";

const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Default)]
pub struct SdkRequest {
    /// Language names, case-insensitive. Defaults to python and javascript.
    pub languages: Option<Vec<String>>,
    /// Base package name in kebab-case.
    pub package_name: Option<String>,
    pub version: Option<String>,
    pub items: Vec<DiscoveredItem>,
}

/// Generates client SDKs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkGenerator;

impl SdkGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate one bundle per requested language, keyed by language.
    ///
    /// # Errors
    ///
    /// Fails with `Validation` for an empty language list or name, and with
    /// `Unsupported` for a language outside [`SUPPORTED_LANGUAGES`].
    pub fn generate(
        &self,
        request: &SdkRequest,
    ) -> Result<BTreeMap<String, SdkBundle>, CollaboratorError> {
        let languages = normalize_languages(request.languages.as_deref())?;
        let base = request
            .package_name
            .as_deref()
            .unwrap_or(DEFAULT_PACKAGE_NAME);
        let words = words(base);
        if words.is_empty() {
            return Err(CollaboratorError::validation(
                "package name must contain letters or digits",
            ));
        }
        let version = request.version.as_deref().unwrap_or(DEFAULT_VERSION);

        let mut bundles = BTreeMap::new();
        for language in languages {
            let bundle = render(&language, &words, version, &request.items);
            bundles.insert(language, bundle);
        }
        Ok(bundles)
    }
}

fn normalize_languages(requested: Option<&[String]>) -> Result<Vec<String>, CollaboratorError> {
    let Some(requested) = requested else {
        return Ok(DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect());
    };
    if requested.is_empty() {
        return Err(CollaboratorError::validation("at least one language is required"));
    }

    let mut languages: Vec<String> = Vec::with_capacity(requested.len());
    for raw in requested {
        let language = raw.trim().to_lowercase();
        if language.is_empty() {
            return Err(CollaboratorError::validation("language name must not be empty"));
        }
        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return Err(CollaboratorError::new(
                CollaboratorErrorKind::Unsupported,
                format!(
                    "language '{}' is not supported (supported: {})",
                    raw.trim(),
                    SUPPORTED_LANGUAGES.join(", ")
                ),
            ));
        }
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    Ok(languages)
}

fn words(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn pascal(words: &[String]) -> String {
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn camel(words: &[String]) -> String {
    let pascal = pascal(words);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => pascal,
    }
}

/// Method words and resource path for one item: "Auth API" gives `["auth"]`, "/auth".
fn resource(item: &DiscoveredItem) -> (Vec<String>, String) {
    let mut words = words(&item.name);
    if words.len() > 1 && words.last().map(String::as_str) == Some("api") {
        words.pop();
    }
    if words.is_empty() {
        words.push("api".to_string());
    }
    let path = format!("/{}", words.join("-"));
    (words, path)
}

fn render(language: &str, words: &[String], version: &str, items: &[DiscoveredItem]) -> SdkBundle {
    let class = pascal(words);
    let (package_name, file_name, code) = match language {
        "python" => {
            let package = words.join("_");
            let file = format!("{}.py", package);
            (package, file, python(&class, items))
        }
        "javascript" => {
            let package = words.join("-");
            let file = format!("{}.js", package);
            (package, file, javascript(&class, items, false))
        }
        "typescript" => {
            let package = words.join("-");
            let file = format!("{}.ts", package);
            (package, file, javascript(&class, items, true))
        }
        _ => {
            let package = words.join(".");
            let file = format!("{}.java", class);
            (package.clone(), file, java(&package, &class, items))
        }
    };

    SdkBundle {
        language: language.to_string(),
        package_name,
        version: version.to_string(),
        file_name,
        code,
    }
}

fn python(class: &str, items: &[DiscoveredItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "import requests\n\n");
    let _ = writeln!(out, "class {}:", class);
    let _ = writeln!(out, "    def __init__(self, base_url, api_key):");
    let _ = writeln!(out, "        self.base_url = base_url.rstrip(\"/\")");
    let _ = writeln!(out, "        self.api_key = api_key\n");
    let _ = writeln!(out, "    def _get(self, path):");
    let _ = writeln!(
        out,
        "        headers = {{\"Authorization\": f\"Bearer {{self.api_key}}\"}}"
    );
    let _ = writeln!(
        out,
        "        response = requests.get(self.base_url + path, headers=headers)"
    );
    let _ = writeln!(out, "        response.raise_for_status()");
    let _ = writeln!(out, "        return response.json()");
    for item in items {
        let (words, path) = resource(item);
        let _ = writeln!(out);
        let _ = writeln!(out, "    def list_{}(self):", words.join("_"));
        let _ = writeln!(out, "        \"\"\"{} v{}\"\"\"", item.name, item.version);
        let _ = writeln!(out, "        return self._get(\"{}\")", path);
    }
    out
}

fn javascript(class: &str, items: &[DiscoveredItem], typed: bool) -> String {
    let (field, arg, ret) = if typed {
        ("  private baseUrl: string;\n  private apiKey: string;\n\n", ": string", ": Promise<unknown>")
    } else {
        ("", "", "")
    };

    let mut out = String::new();
    let _ = writeln!(out, "export class {} {{", class);
    out.push_str(field);
    let _ = writeln!(out, "  constructor(baseUrl{arg}, apiKey{arg}) {{");
    let _ = writeln!(out, "    this.baseUrl = baseUrl.replace(/\\/$/, \"\");");
    let _ = writeln!(out, "    this.apiKey = apiKey;");
    let _ = writeln!(out, "  }}\n");
    let _ = writeln!(out, "  async get(path{arg}){ret} {{");
    let _ = writeln!(out, "    const response = await fetch(this.baseUrl + path, {{");
    let _ = writeln!(
        out,
        "      headers: {{ Authorization: `Bearer ${{this.apiKey}}` }},"
    );
    let _ = writeln!(out, "    }});");
    let _ = writeln!(out, "    if (!response.ok) throw new Error(`HTTP ${{response.status}}`);");
    let _ = writeln!(out, "    return response.json();");
    let _ = writeln!(out, "  }}");
    for item in items {
        let (words, path) = resource(item);
        let mut method = vec!["list".to_string()];
        method.extend(words);
        let _ = writeln!(out);
        let _ = writeln!(out, "  /** {} v{} */", item.name, item.version);
        let _ = writeln!(out, "  {}(){ret} {{", camel(&method));
        let _ = writeln!(out, "    return this.get(\"{}\");", path);
        let _ = writeln!(out, "  }}");
    }
    let _ = writeln!(out, "}}");
    out
}

fn java(package: &str, class: &str, items: &[DiscoveredItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "package {};\n", package);
    let _ = writeln!(out, "import java.net.URI;");
    let _ = writeln!(out, "import java.net.http.HttpClient;");
    let _ = writeln!(out, "import java.net.http.HttpRequest;");
    let _ = writeln!(out, "import java.net.http.HttpResponse;\n");
    let _ = writeln!(out, "public class {} {{", class);
    let _ = writeln!(out, "    private final HttpClient http = HttpClient.newHttpClient();");
    let _ = writeln!(out, "    private final String baseUrl;");
    let _ = writeln!(out, "    private final String apiKey;\n");
    let _ = writeln!(out, "    public {}(String baseUrl, String apiKey) {{", class);
    let _ = writeln!(out, "        this.baseUrl = baseUrl;");
    let _ = writeln!(out, "        this.apiKey = apiKey;");
    let _ = writeln!(out, "    }}\n");
    let _ = writeln!(out, "    private String get(String path) throws Exception {{");
    let _ = writeln!(out, "        HttpRequest request = HttpRequest.newBuilder(URI.create(baseUrl + path))");
    let _ = writeln!(out, "            .header(\"Authorization\", \"Bearer \" + apiKey)");
    let _ = writeln!(out, "            .build();");
    let _ = writeln!(
        out,
        "        return http.send(request, HttpResponse.BodyHandlers.ofString()).body();"
    );
    let _ = writeln!(out, "    }}");
    for item in items {
        let (words, path) = resource(item);
        let mut method = vec!["list".to_string()];
        method.extend(words);
        let _ = writeln!(out);
        let _ = writeln!(out, "    /** {} v{} */", item.name, item.version);
        let _ = writeln!(out, "    public String {}() throws Exception {{", camel(&method));
        let _ = writeln!(out, "        return get(\"{}\");", path);
        let _ = writeln!(out, "    }}");
    }
    let _ = writeln!(out, "}}");
    out
}
