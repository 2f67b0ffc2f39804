// ============================================================================
// Configuration
// ============================================================================
// Paramètres optionnels lus depuis ~/.config/lazyfx/config.toml
//
// Exemple :
// ```toml
// api_base_url = "https://api.exchangerate-api.com/v4/latest"
// request_timeout_secs = 5
// default_amount = "100"
// default_source = "EUR"
// default_target = "JPY"
// ```
//
// CONCEPTS RUST :
// 1. #[serde(default)] : chaque champ absent prend sa valeur par défaut
// 2. anyhow::Context : messages d'erreur explicites pour le setup
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::exchange_rate::DEFAULT_API_BASE_URL;
use crate::models::currency;

/// Nom du répertoire de l'application (config, données)
pub const APP_DIR_NAME: &str = "lazyfx";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL du service de taux (la devise de base est ajoutée en suffixe)
    pub api_base_url: String,

    /// Timeout d'une requête de taux, en secondes
    pub request_timeout_secs: u64,

    /// Montant affiché au démarrage
    pub default_amount: String,

    /// Devise source au démarrage
    pub default_source: String,

    /// Devise cible au démarrage
    pub default_target: String,

    /// Répertoire des données (favoris) ; par défaut ~/.local/share/lazyfx
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 10,
            default_amount: "1".to_string(),
            default_source: "USD".to_string(),
            default_target: "EUR".to_string(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Chemin standard du fichier de configuration
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
    }

    /// Charge la configuration depuis le chemin standard
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Charge la configuration depuis un fichier ; absent → valeurs par défaut
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(?path, "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Échec de la lecture de {}", path.display()))
            }
        };

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Configuration invalide dans {}", path.display()))?;

        info!(?path, "Config loaded");
        Ok(config.sanitized())
    }

    /// Remplace les devises hors catalogue par les valeurs par défaut
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !currency::is_supported(&self.default_source) {
            warn!(code = %self.default_source, "Unknown default source currency, using USD");
            self.default_source = defaults.default_source.clone();
        }
        if !currency::is_supported(&self.default_target) {
            warn!(code = %self.default_target, "Unknown default target currency, using EUR");
            self.default_target = defaults.default_target;
        }

        self.default_source = self.default_source.to_uppercase();
        self.default_target = self.default_target.to_uppercase();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Répertoire des favoris
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .context("Impossible de déterminer le répertoire de données"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_amount = \"250\"\ndefault_target = \"jpy\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_amount, "250");
        assert_eq!(config.default_target, "JPY");
        assert_eq!(config.default_source, "USD");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_unknown_currency_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_source = \"BTC\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_source, "USD");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "request_timeout_secs = \"ten\"").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_data_dir_override() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/lazyfx-test")),
            ..Config::default()
        };
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/lazyfx-test"));
    }
}
