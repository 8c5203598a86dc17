//! Viewer state machine
//!
//! **[VWR-ST-010]** Exactly one section is active at a time; sections switch
//! only through explicit [`ViewerAction::Navigate`] transitions (the polling
//! driver issues the single automatic Processing → Viewer transition after
//! completion).
//!
//! **[VWR-NAV-010]** Room navigation is cyclic and defined for every room
//! count: on an empty room list all navigation actions are no-ops, and an
//! out-of-range absolute jump is rejected rather than clamped.

use vtour_common::models::{Photo, Room, Tour};

/// Top-level screen selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Upload,
    Broadcast,
    Processing,
    Viewer,
}

/// A locally queued file waiting to be uploaded
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Every way the viewer state may change
#[derive(Debug, Clone)]
pub enum ViewerAction {
    /// Switch the active section
    Navigate(Section),
    /// Adopt a (re)fetched tour record
    TourUpdated(Tour),
    /// Adopt the fetched room list; the room cursor resets to the first room
    RoomsLoaded(Vec<Room>),
    /// Adopt the fetched photo list
    PhotosLoaded(Vec<Photo>),

    /// Advance the room cursor with wraparound
    NextRoom,
    /// Decrement the room cursor with wraparound
    PreviousRoom,
    /// Absolute jump; rejected when out of range
    GoToRoom(usize),

    /// Append files to the upload queue
    QueueFiles(Vec<PendingFile>),
    /// Drop one queued file by position; rejected when out of range
    RemoveFile(usize),
    /// Empty the upload queue
    ClearFiles,
    /// An upload request went out
    UploadStarted,
    /// Advisory upload progress, 0-100
    UploadProgress(u8),
    /// The upload response arrived; the queue has served its purpose
    UploadFinished,
}

/// Client-held viewer state; mutate only through [`ViewerState::apply`]
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub section: Section,
    pub tour: Option<Tour>,
    pub rooms: Vec<Room>,
    pub photos: Vec<Photo>,
    pub current_room_index: usize,

    pub queued_files: Vec<PendingFile>,
    pub is_uploading: bool,
    pub upload_progress: u8,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            section: Section::Home,
            tour: None,
            rooms: Vec::new(),
            photos: Vec::new(),
            current_room_index: 0,
            queued_files: Vec::new(),
            is_uploading: false,
            upload_progress: 0,
        }
    }
}

impl ViewerState {
    /// Reducer-style transition function
    pub fn apply(&mut self, action: ViewerAction) {
        match action {
            ViewerAction::Navigate(section) => self.section = section,
            ViewerAction::TourUpdated(tour) => self.tour = Some(tour),
            ViewerAction::RoomsLoaded(rooms) => {
                self.rooms = rooms;
                self.current_room_index = 0;
            }
            ViewerAction::PhotosLoaded(photos) => self.photos = photos,

            ViewerAction::NextRoom => {
                if !self.rooms.is_empty() {
                    self.current_room_index = (self.current_room_index + 1) % self.rooms.len();
                }
            }
            ViewerAction::PreviousRoom => {
                if !self.rooms.is_empty() {
                    self.current_room_index = if self.current_room_index == 0 {
                        self.rooms.len() - 1
                    } else {
                        self.current_room_index - 1
                    };
                }
            }
            ViewerAction::GoToRoom(index) => {
                if index < self.rooms.len() {
                    self.current_room_index = index;
                }
            }

            ViewerAction::QueueFiles(files) => self.queued_files.extend(files),
            ViewerAction::RemoveFile(index) => {
                if index < self.queued_files.len() {
                    self.queued_files.remove(index);
                }
            }
            ViewerAction::ClearFiles => self.queued_files.clear(),
            ViewerAction::UploadStarted => {
                self.is_uploading = true;
                self.upload_progress = 0;
            }
            ViewerAction::UploadProgress(progress) => {
                self.upload_progress = progress.min(100);
            }
            ViewerAction::UploadFinished => {
                self.is_uploading = false;
                self.upload_progress = 100;
                self.queued_files.clear();
            }
        }
    }

    /// The room the viewer is currently showing, if any
    pub fn current_room(&self) -> Option<&Room> {
        self.rooms.get(self.current_room_index)
    }
}
