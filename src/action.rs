/// All user intents (actions) that can be performed in the application
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Quit the application
    Quit,

    /// Freeze or resume the display; polling carries on either way
    TogglePause,

    /// Drop every sample from the history
    ClearHistory,

    /// Chart the next tracked channel
    NextSeries,

    /// Chart the previous tracked channel
    PreviousSeries,

    /// Open the resolver URL prompt
    StartEditEndpoint,

    /// Open the export path prompt
    StartExport,

    /// Append one character to the open prompt
    InputChar(char),

    /// Delete one character from the open prompt
    InputBackspace,

    /// Apply the open prompt
    ConfirmInput,

    /// Close the open prompt without applying it
    CancelInput,

    /// Switch to next color scheme
    SwitchTheme,

    /// Save current configuration
    SaveConfig,
}
