//! Scaffolding commands.
//!
//! Each command asks its questions through a [`Prompter`] and writes JSON
//! (or a script) below the working directory.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::ScaffoldError;
use crate::prompt::Prompter;

const MODELS_DIR: &str = "common/models";
const DATASOURCES_FILE: &str = "server/datasources.json";
const BOOT_DIR: &str = "server/boot";
const MIDDLEWARE_FILE: &str = "server/middleware.json";

const PROPERTY_TYPES: &[&str] = &["string", "number", "boolean", "object", "array", "date", "any"];

const MIDDLEWARE_PHASES: &[&str] = &["initial", "session", "auth", "parse", "routes", "files", "final"];
const ROUTES_PHASE: usize = 4;

const RELATION_TYPES: &[&str] = &["has many", "belongs to", "has and belongs to many", "has one"];

const ALL_MODELS: &str = "(all existing models)";

fn model_path(name: &str) -> PathBuf {
    Path::new(MODELS_DIR).join(format!("{name}.json"))
}

fn relation_type_key(kind: &str) -> &'static str {
    match kind {
        "belongs to" => "belongsTo",
        "has and belongs to many" => "hasAndBelongsToMany",
        "has one" => "hasOne",
        _ => "hasMany",
    }
}

/// The object stored under `key`, created if missing or not an object.
fn section<'v>(value: &'v mut Value, key: &str) -> &'v mut Value {
    if !value[key].is_object() {
        value[key] = json!({});
    }
    &mut value[key]
}

/// Options shared by the commands.
#[derive(Debug, Default)]
pub struct Options {
    /// First positional argument after the command.
    pub name: Option<String>,
    /// `--skip-next-steps`.
    pub skip_next_steps: bool,
}

pub struct Generator<R, W> {
    prompter: Prompter<R, W>,
    root: PathBuf,
}

impl<R: BufRead, W: Write> Generator<R, W> {
    pub fn new(prompter: Prompter<R, W>, root: impl Into<PathBuf>) -> Self {
        Self {
            prompter,
            root: root.into(),
        }
    }

    fn created(&mut self, path: &Path) -> Result<(), ScaffoldError> {
        let shown = path.strip_prefix(&self.root).unwrap_or(path);
        writeln!(self.prompter.output(), "\x1b[32m   create\x1b[39m {}", shown.display())?;
        self.prompter.output().flush()?;
        Ok(())
    }

    fn write_json(&mut self, relative: impl AsRef<Path>, value: &Value) -> Result<(), ScaffoldError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(value)? + "\n")?;
        self.created(&path)
    }

    fn read_json(&self, relative: impl AsRef<Path>) -> Result<Option<Value>, ScaffoldError> {
        let path = self.root.join(relative);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&fs::read_to_string(path)?)?))
    }

    /// `app [name]`
    pub fn app(&mut self, options: &Options) -> Result<(), ScaffoldError> {
        let default_name = options.name.as_deref().unwrap_or("my-app");
        let name = self
            .prompter
            .input("What's the name of your application?", Some(default_name))?;
        let dir = self.prompter.input(
            "Enter name of the directory to contain the project:",
            Some(&name),
        )?;

        let project = PathBuf::from(&dir);
        self.write_json(
            project.join("package.json"),
            &json!({ "name": name, "version": "1.0.0", "main": "server/server.js" }),
        )?;
        self.write_json(project.join(DATASOURCES_FILE), &json!({}))?;

        if !options.skip_next_steps {
            eprintln!("\nNext steps:\n\n  Change directory to your app\n    $ cd {dir}\n");
        }
        Ok(())
    }

    /// `model [name]`
    pub fn model(&mut self, options: &Options) -> Result<(), ScaffoldError> {
        let name = self
            .prompter
            .input("Enter the model name:", options.name.as_deref())?;
        if name.is_empty() {
            return Err(ScaffoldError::Usage("model name must not be empty".into()));
        }

        let base = self
            .prompter
            .list("Select model's base class", &["PersistedModel", "Model"])?;
        let public = self
            .prompter
            .confirm(&format!("Expose {name} via the REST API?"), true)?;
        let plural = self
            .prompter
            .input("Custom plural form (used to build REST URL):", None)?;

        let mut properties = Map::new();
        // Buffered so the intro reaches the pipe together with the first question
        write!(
            self.prompter.output(),
            "Let's add some {name} properties now.\n\nEnter an empty property name when done.\n"
        )?;
        loop {
            let property = self.prompter.input("Property name:", None)?;
            if property.is_empty() {
                break;
            }
            let definition = self.property_definition()?;
            properties.insert(property, definition);
        }

        let mut model = json!({
            "name": name,
            "base": base,
            "public": public,
            "properties": properties,
        });
        if !plural.is_empty() {
            model["plural"] = Value::String(plural);
        }

        self.write_json(model_path(&name), &model)
    }

    fn property_definition(&mut self) -> Result<Value, ScaffoldError> {
        let kind = self.prompter.list("Property type:", PROPERTY_TYPES)?;
        let required = self.prompter.confirm("Required?", false)?;
        let default = self
            .prompter
            .input("Default value[leave blank for none]:", None)?;

        let mut definition = json!({ "type": kind, "required": required });
        if !default.is_empty() {
            definition["default"] = Value::String(default);
        }
        Ok(definition)
    }

    /// `property`
    pub fn property(&mut self) -> Result<(), ScaffoldError> {
        let models = self.existing_models()?;
        let choices: Vec<&str> = models.iter().map(String::as_str).collect();

        let model_name = self.prompter.list("Select the model:", &choices)?;
        let property = self.prompter.input("Enter the property name:", None)?;
        if property.is_empty() {
            return Err(ScaffoldError::Usage("property name must not be empty".into()));
        }
        let definition = self.property_definition()?;

        let mut model = self.load_model(model_name)?;
        section(&mut model, "properties")[property.as_str()] = definition;
        self.save_model(model_name, &model)
    }

    /// `remote-method`
    pub fn remote_method(&mut self) -> Result<(), ScaffoldError> {
        let models = self.existing_models()?;
        let choices: Vec<&str> = models.iter().map(String::as_str).collect();

        let model_name = self.prompter.list("Select the model:", &choices)?;
        let method = self.prompter.input("Enter the remote method name:", None)?;
        if method.is_empty() {
            return Err(ScaffoldError::Usage("method name must not be empty".into()));
        }
        let is_static = self.prompter.confirm("Is Static?", true)?;
        let description = self.prompter.input("Description for method:", None)?;

        write!(
            self.prompter.output(),
            "Let's configure where to expose your new method in the public REST API.\n\
             You can provide multiple HTTP endpoints, enter an empty path when you are done.\n"
        )?;
        let mut http = Vec::new();
        loop {
            let path = self.prompter.input("Enter the path of this endpoint:", None)?;
            if path.is_empty() {
                break;
            }
            let verb = self
                .prompter
                .list("HTTP verb:", &["get", "post", "patch", "put", "delete", "head"])?;
            http.push(json!({ "path": path, "verb": verb }));
        }

        write!(
            self.prompter.output(),
            "Describe the input (\"accepts\") arguments of your remote method.\n\
             You can define multiple input arguments, enter an empty name when you are done.\n"
        )?;
        let accepts = self.arguments()?;
        write!(
            self.prompter.output(),
            "Describe the output (\"returns\") arguments to the remote method's callback function.\n\
             You can define multiple output arguments, enter an empty name when you are done.\n"
        )?;
        let returns = self.arguments()?;

        let key = if is_static {
            method
        } else {
            format!("prototype.{method}")
        };
        let mut model = self.load_model(model_name)?;
        section(&mut model, "methods")[key.as_str()] = json!({
            "accepts": accepts,
            "returns": returns,
            "description": description,
            "http": http,
        });
        self.save_model(model_name, &model)
    }

    fn arguments(&mut self) -> Result<Vec<Value>, ScaffoldError> {
        let mut arguments = Vec::new();
        loop {
            let name = self
                .prompter
                .input("What is the name of this argument?", None)?;
            if name.is_empty() {
                return Ok(arguments);
            }
            let kind = self.prompter.list("Select argument's type:", PROPERTY_TYPES)?;
            arguments.push(json!({ "arg": name, "type": kind }));
        }
    }

    /// `middleware`
    pub fn middleware(&mut self) -> Result<(), ScaffoldError> {
        let name = self.prompter.input("Enter the middleware name:", None)?;
        if name.is_empty() {
            return Err(ScaffoldError::Usage("middleware name must not be empty".into()));
        }
        let phase = self.prompter.select(
            &format!("Select the phase for {name}:"),
            MIDDLEWARE_PHASES,
            ROUTES_PHASE,
        )?;
        let sub_phase = self.prompter.select(
            &format!("Select the sub phase for {name}:"),
            &["before", "regular", "after"],
            1,
        )?;

        write!(
            self.prompter.output(),
            "Specify paths for {name}:\nEnter an empty path name when done.\n"
        )?;
        let mut paths = Vec::new();
        loop {
            let path = self.prompter.input("Path uri:", None)?;
            if path.is_empty() {
                break;
            }
            paths.push(Value::String(path));
        }

        let config = self
            .prompter
            .input("Configuration parameters in JSON format:", Some("{}"))?;
        let params: Value = serde_json::from_str(&config)?;

        let phase_key = match sub_phase {
            "regular" => phase.to_string(),
            other => format!("{phase}:{other}"),
        };
        let mut entry = json!({ "params": params });
        if !paths.is_empty() {
            entry["paths"] = Value::Array(paths);
        }

        let mut all = self
            .read_json(MIDDLEWARE_FILE)?
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));
        section(&mut all, &phase_key)[name.as_str()] = entry;
        self.write_json(MIDDLEWARE_FILE, &all)
    }

    /// `relation`
    pub fn relation(&mut self) -> Result<(), ScaffoldError> {
        let models = self.existing_models()?;
        let choices: Vec<&str> = models.iter().map(String::as_str).collect();

        let from = self
            .prompter
            .list("Select the model to create the relationship from:", &choices)?;
        let kind = self.prompter.list("Relation type:", RELATION_TYPES)?;
        let to = self
            .prompter
            .list("Choose a model to create a relationship with:", &choices)?;

        let default_name = match kind {
            "has many" | "has and belongs to many" => format!("{to}s"),
            _ => to.to_string(),
        };
        let name = self.prompter.input(
            "Enter the property name for the relation:",
            Some(&default_name),
        )?;
        let foreign_key = self
            .prompter
            .input("Optionally enter a custom foreign key:", None)?;
        let through = self.prompter.confirm("Require a through model?", false)?;
        if through {
            return Err(ScaffoldError::Usage("through models are not supported".into()));
        }

        let mut model = self.load_model(from)?;
        section(&mut model, "relations")[name.as_str()] = json!({
            "type": relation_type_key(kind),
            "model": to,
            "foreignKey": foreign_key,
        });
        self.save_model(from, &model)
    }

    /// `acl`: every question is a selection.
    pub fn acl(&mut self) -> Result<(), ScaffoldError> {
        let models = self.existing_models()?;
        let mut choices = vec![ALL_MODELS];
        choices.extend(models.iter().map(String::as_str));

        let target = self
            .prompter
            .list("Select the model to apply the ACL entry to:", &choices)?;
        let scope = self.prompter.list(
            "Select the ACL scope:",
            &["All methods and properties", "A single method"],
        )?;
        if scope != "All methods and properties" {
            return Err(ScaffoldError::Usage("method-level ACLs are not supported".into()));
        }
        let access = self.prompter.list(
            "Select the access type:",
            &["All (match all types)", "Read", "Write", "Execute"],
        )?;
        let role = self.prompter.list(
            "Select the role",
            &[
                "All users",
                "Any unauthenticated user",
                "Any authenticated user",
                "The user owning the object",
            ],
        )?;
        let permission = self.prompter.list(
            "Select the permission to apply",
            &["Explicitly grant access", "Explicitly deny access"],
        )?;

        let access_type = match access {
            "Read" => "READ",
            "Write" => "WRITE",
            "Execute" => "EXECUTE",
            _ => "*",
        };
        let principal = match role {
            "Any unauthenticated user" => "$unauthenticated",
            "Any authenticated user" => "$authenticated",
            "The user owning the object" => "$owner",
            _ => "$everyone",
        };
        let permission = if permission == "Explicitly deny access" {
            "DENY"
        } else {
            "ALLOW"
        };
        let entry = json!({
            "accessType": access_type,
            "principalType": "ROLE",
            "principalId": principal,
            "permission": permission,
        });

        let targets: Vec<&str> = if target == ALL_MODELS {
            models.iter().map(String::as_str).collect()
        } else {
            vec![target]
        };
        for name in targets {
            let mut model = self.load_model(name)?;
            if !model["acls"].is_array() {
                model["acls"] = json!([]);
            }
            if let Some(acls) = model["acls"].as_array_mut() {
                acls.push(entry.clone());
            }
            self.save_model(name, &model)?;
        }
        Ok(())
    }

    /// Names of the models in the project; an empty project is an error.
    fn existing_models(&self) -> Result<Vec<String>, ScaffoldError> {
        let names = self.model_names()?;
        if names.is_empty() {
            return Err(ScaffoldError::Usage(format!("no models found in {MODELS_DIR}")));
        }
        Ok(names)
    }

    fn model_names(&self) -> Result<Vec<String>, ScaffoldError> {
        let dir = self.root.join(MODELS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn load_model(&self, name: &str) -> Result<Value, ScaffoldError> {
        let model = self.read_json(model_path(name))?;
        Ok(model.filter(Value::is_object).unwrap_or_else(|| json!({ "name": name })))
    }

    fn save_model(&mut self, name: &str, model: &Value) -> Result<(), ScaffoldError> {
        self.write_json(model_path(name), model)
    }

    /// `datasource`
    pub fn datasource(&mut self) -> Result<(), ScaffoldError> {
        let name = self.prompter.input("Enter the datasource name:", None)?;
        if name.is_empty() {
            return Err(ScaffoldError::Usage("datasource name must not be empty".into()));
        }
        let connector = self.prompter.list(
            &format!("Select the connector for {name}:"),
            &["In-memory db (supported by StrongLoop)", "Other"],
        )?;

        let mut datasource = json!({ "name": name });
        if connector.starts_with("In-memory") {
            datasource["connector"] = json!("memory");
            let key = self.prompter.input(
                "window.localStorage key to use for persistence (browser only):",
                None,
            )?;
            let file = self
                .prompter
                .input("Full path to file for persistence (server only):", None)?;
            if !key.is_empty() {
                datasource["localStorage"] = Value::String(key);
            }
            if !file.is_empty() {
                datasource["file"] = Value::String(file);
            }
        } else {
            datasource["connector"] = json!("other");
        }

        let mut all = self
            .read_json(DATASOURCES_FILE)?
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));
        all[name.as_str()] = datasource;
        self.write_json(DATASOURCES_FILE, &all)
    }

    /// `boot-script`
    pub fn boot_script(&mut self) -> Result<(), ScaffoldError> {
        let name = self
            .prompter
            .input("Enter the script name (without .js):", None)?;
        if name.is_empty() {
            return Err(ScaffoldError::Usage("script name must not be empty".into()));
        }
        let kind = self.prompter.list(
            "What type of boot script do you want to generate?",
            &["async", "sync"],
        )?;

        let body = if kind == "async" {
            "module.exports = function(app, cb) {\n  process.nextTick(cb);\n};\n"
        } else {
            "module.exports = function(app) {\n};\n"
        };

        let path = self.root.join(BOOT_DIR).join(format!("{name}.js"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        self.created(&path)
    }

    /// `crash`: asks a question, then dies without reading the answer.
    pub fn crash(&mut self) -> ! {
        let _ = write!(self.prompter.output(), "? Continue with the crash? (Y/n) ");
        let _ = self.prompter.output().flush();
        std::process::abort()
    }

    /// `mystery`: asks a question nothing recognizes and waits for an answer.
    pub fn mystery(&mut self) -> Result<(), ScaffoldError> {
        let colour = self
            .prompter
            .input("Pick your favourite colour, any colour at all:", None)?;
        writeln!(self.prompter.output(), "You picked {colour}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn generator(root: &Path, input: &str) -> Generator<Cursor<Vec<u8>>, Vec<u8>> {
        Generator::new(
            Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new()),
            root,
        )
    }

    fn temp_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "test-scaffold-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn model_with_one_property() {
        let root = temp_root("model");
        // name, base, expose, plural, property, type, required, default, done
        let input = "pets\n\n\n\nname\n\ny\nrex\n\n";
        generator(&root, input).model(&Options::default()).unwrap();

        let model: Value =
            serde_json::from_str(&fs::read_to_string(root.join("common/models/pets.json")).unwrap())
                .unwrap();
        assert_eq!(model["name"], "pets");
        assert_eq!(model["base"], "PersistedModel");
        assert_eq!(model["public"], true);
        assert_eq!(model["properties"]["name"]["type"], "string");
        assert_eq!(model["properties"]["name"]["required"], true);
        assert_eq!(model["properties"]["name"]["default"], "rex");
        assert!(model.get("plural").is_none());
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn datasources_are_merged() {
        let root = temp_root("datasource");
        generator(&root, "db\n\nkey\n\n").datasource().unwrap();
        generator(&root, "other\nOther\n").datasource().unwrap();

        let all: Value =
            serde_json::from_str(&fs::read_to_string(root.join(DATASOURCES_FILE)).unwrap()).unwrap();
        assert_eq!(all["db"]["connector"], "memory");
        assert_eq!(all["db"]["localStorage"], "key");
        assert!(all["db"].get("file").is_none());
        assert_eq!(all["other"]["connector"], "other");
        fs::remove_dir_all(root).unwrap();
    }

    fn seed_model(root: &Path, name: &str) {
        let path = root.join(model_path(name));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!(r#"{{ "name": "{name}", "properties": {{}} }}"#)).unwrap();
    }

    fn read(root: &Path, relative: impl AsRef<Path>) -> Value {
        serde_json::from_str(&fs::read_to_string(root.join(relative)).unwrap()).unwrap()
    }

    #[test]
    fn remote_method_with_defaults_is_static() {
        let root = temp_root("remote-method");
        seed_model(&root, "note");
        // model, name, static, description, no endpoint, no accepts, no returns
        generator(&root, "\nsummarize\n\nSums up\n\n\n\n")
            .remote_method()
            .unwrap();

        let model = read(&root, model_path("note"));
        let method = &model["methods"]["summarize"];
        assert_eq!(method["description"], "Sums up");
        assert_eq!(method["accepts"], json!([]));
        assert_eq!(method["http"], json!([]));
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn remote_method_records_endpoints_and_instance_methods() {
        let root = temp_root("remote-method-http");
        seed_model(&root, "note");
        let input = "\nrender\nn\n\n/render\npost\n\nformat\n\n\n\n";
        generator(&root, input).remote_method().unwrap();

        let model = read(&root, model_path("note"));
        let method = &model["methods"]["prototype.render"];
        assert_eq!(method["http"], json!([{ "path": "/render", "verb": "post" }]));
        assert_eq!(method["accepts"], json!([{ "arg": "format", "type": "string" }]));
        assert_eq!(method["returns"], json!([]));
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn middleware_defaults_to_the_routes_phase() {
        let root = temp_root("middleware");
        // name, phase, sub phase, one path, done, config
        let input = "logger\n\n\n/api\n\n{ \"level\": 3 }\n";
        generator(&root, input).middleware().unwrap();
        generator(&root, "timer\ninitial\nbefore\n\n\n").middleware().unwrap();

        let all = read(&root, MIDDLEWARE_FILE);
        assert_eq!(all["routes"]["logger"]["params"], json!({ "level": 3 }));
        assert_eq!(all["routes"]["logger"]["paths"], json!(["/api"]));
        assert_eq!(all["initial:before"]["timer"], json!({ "params": {} }));
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn middleware_rejects_malformed_config() {
        let root = temp_root("middleware-json");
        let err = generator(&root, "logger\n\n\n\n{ nope\n")
            .middleware()
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Json(_)));
        assert!(!root.join(MIDDLEWARE_FILE).exists());
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn relation_defaults_to_the_plural_target() {
        let root = temp_root("relation");
        seed_model(&root, "author");
        seed_model(&root, "book");
        // from, type, target, name, foreign key, through
        generator(&root, "\n\nbook\n\nauthorId\n\n").relation().unwrap();

        let model = read(&root, model_path("author"));
        assert_eq!(
            model["relations"]["books"],
            json!({ "type": "hasMany", "model": "book", "foreignKey": "authorId" })
        );
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn acl_applies_to_every_model_by_default() {
        let root = temp_root("acl");
        seed_model(&root, "author");
        seed_model(&root, "book");
        generator(&root, "\n\n\n\nExplicitly deny access\n").acl().unwrap();

        for name in ["author", "book"] {
            let model = read(&root, model_path(name));
            assert_eq!(
                model["acls"],
                json!([{
                    "accessType": "*",
                    "principalType": "ROLE",
                    "principalId": "$everyone",
                    "permission": "DENY",
                }])
            );
        }
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn property_requires_a_model() {
        let root = temp_root("property");
        let err = generator(&root, "\n").property().unwrap_err();
        assert!(matches!(err, ScaffoldError::Usage(_)));
        fs::remove_dir_all(root).unwrap();
    }
}
