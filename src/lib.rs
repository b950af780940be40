// ============================================================================
// eSett Viewer - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;    // Client eSett + cache
pub mod app;    // État de l'application
pub mod config; // Arguments CLI et configuration
pub mod export; // Export CSV
pub mod models; // Structures de données
pub mod ui;     // Interface utilisateur
